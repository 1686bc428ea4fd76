pub mod client;
pub mod credentials;
pub mod ingestion;
pub mod table;
