use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Data-handling operation a policy decision is requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Store,
    Process,
    Transfer,
    Log,
    Display,
    Export,
}

impl_domain_status_conversions!(Operation {
    Store => "store",
    Process => "process",
    Transfer => "transfer",
    Log => "log",
    Display => "display",
    Export => "export",
});

impl Operation {
    /// Every operation, in declaration order
    pub const ALL: [Operation; 6] = [
        Operation::Store,
        Operation::Process,
        Operation::Transfer,
        Operation::Log,
        Operation::Display,
        Operation::Export,
    ];

    /// Operations that expose the value to a human or a log sink
    pub const fn is_presentation(self) -> bool {
        matches!(self, Self::Display | Self::Log)
    }

    /// Operations where the value leaves the process at rest or in transit
    pub const fn is_persistence(self) -> bool {
        matches!(self, Self::Store | Self::Transfer | Self::Export)
    }
}
