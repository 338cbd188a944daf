//! Port for external named-entity recognizers

use piiguard_domain::{EntityKind, EntityStrength};
use serde::{Deserialize, Serialize};

/// Entity reported by a recognizer, with byte offsets into the scanned text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedEntity {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub kind: EntityKind,
    #[serde(default)]
    pub strength: EntityStrength,
}

impl RecognizedEntity {
    pub fn new(start: usize, end: usize, text: impl Into<String>, kind: EntityKind) -> Self {
        Self { start, end, text: text.into(), kind, strength: EntityStrength::Normal }
    }

    #[must_use]
    pub fn strong(mut self) -> Self {
        self.strength = EntityStrength::Strong;
        self
    }

    /// True when the entity describes exactly `text[start..end]`
    pub fn is_faithful_to(&self, text: &str) -> bool {
        self.start < self.end
            && text.get(self.start..self.end).is_some_and(|slice| slice == self.text)
    }
}

/// Person and organization recognizer consumed by the detection engine
///
/// Implementations must be callable from several threads at once. Output
/// whose offsets do not reproduce the reported text is discarded.
pub trait EntityRecognizer: Send + Sync {
    fn recognize_entities(&self, text: &str) -> Vec<RecognizedEntity>;
}
