pub mod audit_log_client;
