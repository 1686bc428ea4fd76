pub mod check;
pub mod create_table;
pub mod run;
pub mod sentinel_helpers;
