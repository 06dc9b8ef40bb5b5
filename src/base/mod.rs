//! Base types and error handling.
//!
//! - [`NetError`]: Network error codes matching `net_error_list.h`
//! - [`Error`]: Pipeline result error (build / fatal connect / exec)

pub mod error;
pub mod neterror;

pub use error::{BuildError, Error};
pub use neterror::NetError;
