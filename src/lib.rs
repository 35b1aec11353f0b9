pub mod contexts;
pub mod data;
pub mod ledger;
pub mod log_sink;
pub mod registries;
