pub mod health;
pub mod superusers;
