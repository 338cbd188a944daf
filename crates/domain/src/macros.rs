//! Macro for implementing Display and FromStr for fieldless domain enums
//!
//! Risk bands, confidence bands and operations all round-trip through the
//! same lowercase identifiers in configuration documents, log fields and
//! decision reasons.
//!
//! # Example
//!
//! ```rust
//! use piiguard_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Channel {
//!     Chat,
//!     Email,
//! }
//!
//! impl_domain_status_conversions!(Channel {
//!     Chat => "chat",
//!     Email => "email",
//! });
//! ```

/// Implements Display and FromStr traits for fieldless enums
///
/// This macro generates:
/// - Display trait: converts enum variants to lowercase strings
/// - FromStr trait: parses case-insensitive strings to enum variants
///
/// Parsing failures return a `String` naming the enum and the rejected
/// input, e.g. `Invalid Operation: print`.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
