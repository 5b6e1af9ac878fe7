//! Composable email address validation.
//!
//! A pipeline starts with [`Address::validator`] and chains steps on the
//! resulting [`Outcome`]. The first failing step decides the result; every
//! later step passes the failure through untouched.
//!
//! ```
//! use email_sanitizer::{Address, ErrorKind};
//!
//! let outcome = Address::validator("Someone@Gmial.com")
//!     .validate_format()
//!     .parse()
//!     .lower()
//!     .common_typos();
//!
//! assert_eq!(outcome.error_kind(), Some(ErrorKind::InvalidFormat));
//! ```

pub mod config;
pub mod models;
pub mod outcome;
pub mod pipeline;
pub mod validation;

pub use models::address::Address;
pub use outcome::{ErrorKind, Outcome, ValidationFailure};
