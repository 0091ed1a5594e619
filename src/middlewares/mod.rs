pub mod authentication;
pub mod debug_logging;
pub mod default_headers;
pub mod error_handling;
