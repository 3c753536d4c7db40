pub mod context;
pub mod infrastructure;
pub mod ports;
