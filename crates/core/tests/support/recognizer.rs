//! Scripted `EntityRecognizer` for deterministic tests

use std::sync::atomic::{AtomicUsize, Ordering};

use piiguard_core::{EntityRecognizer, RecognizedEntity};
use piiguard_domain::EntityKind;

/// Returns a fixed set of entities for every call
///
/// Entities can be placed by searching the text they will be run against,
/// or given raw offsets to simulate a misbehaving recognizer.
#[derive(Debug, Default)]
pub struct ScriptedRecognizer {
    entities: Vec<RecognizedEntity>,
    calls: AtomicUsize,
}

impl ScriptedRecognizer {
    pub fn new(entities: Vec<RecognizedEntity>) -> Self {
        Self { entities, calls: AtomicUsize::new(0) }
    }

    /// Adds an entity at the first occurrence of `needle` in `text`
    pub fn with_entity(mut self, text: &str, needle: &str, kind: EntityKind) -> Self {
        self.entities.push(locate(text, needle, kind));
        self
    }

    /// Same as [`with_entity`](Self::with_entity) with a strong classification
    pub fn with_strong_entity(mut self, text: &str, needle: &str, kind: EntityKind) -> Self {
        self.entities.push(locate(text, needle, kind).strong());
        self
    }

    /// Adds an entity with arbitrary offsets
    pub fn with_raw(mut self, entity: RecognizedEntity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EntityRecognizer for ScriptedRecognizer {
    fn recognize_entities(&self, _text: &str) -> Vec<RecognizedEntity> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entities.clone()
    }
}

fn locate(text: &str, needle: &str, kind: EntityKind) -> RecognizedEntity {
    let start = text.find(needle).expect("needle must occur in text");
    RecognizedEntity::new(start, start + needle.len(), needle, kind)
}
