pub mod audit_source;
pub mod log_sink;
