//! Internal utility modules
//!
//! Shared plumbing for the fetch pipeline. Not part of the public API.

pub mod fs_utils;
pub mod http_date;
pub mod progress;
pub mod url_utils;
