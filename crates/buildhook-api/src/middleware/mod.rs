//! HTTP middleware for the buildhook API.

pub mod request_log;

pub use request_log::log_request;
