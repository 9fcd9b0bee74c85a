//! Response middleware.

pub mod error_details;

pub use error_details::attach_error_details;
