//! Macro for implementing Display and FromStr for status enums
//!
//! Backend payloads carry card states and card kinds as loosely-cased
//! strings. This macro gives those enums one consistent string form and a
//! case-insensitive parser.
//!
//! # Example
//!
//! ```rust
//! use cardissue_domain::impl_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum PrintStatus {
//!     Queued,
//!     Printed,
//! }
//!
//! impl_status_conversions!(PrintStatus {
//!     Queued => "queued",
//!     Printed => "printed",
//! });
//! ```

/// Implements Display and FromStr traits for status enums
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their lowercase string
///   representations
#[macro_export]
macro_rules! impl_status_conversions {
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
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
