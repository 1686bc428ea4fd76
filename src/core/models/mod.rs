pub mod audit_event;
pub mod audit_log_page;
pub mod destination;
pub mod flat_record;
