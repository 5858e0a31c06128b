//! Macro for implementing Display and FromStr for status enums
//!
//! Appointment and payment statuses travel as lowercase strings (database
//! columns, webhook bodies, query parameters). This macro gives every status
//! enum the same case-insensitive parsing and lowercase rendering.
//!
//! # Example
//!
//! ```rust
//! use salonbook_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum DepositStatus {
//!     Held,
//!     Released,
//! }
//!
//! impl_domain_status_conversions!(DepositStatus {
//!     Held => "held",
//!     Released => "released",
//! });
//!
//! assert_eq!("HELD".parse::<DepositStatus>().unwrap(), DepositStatus::Held);
//! ```

/// Implements Display and FromStr traits for status enums
///
/// `FromStr` lowercases its input before matching, so every mapped string
/// must itself be lowercase.
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
