pub mod http;
pub mod notion;
pub mod sentinel;
pub mod stdout_sink;
