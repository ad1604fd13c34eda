//! Utility modules.

pub mod timeout;
pub mod url;
