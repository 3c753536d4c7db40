pub mod events;
pub mod superusers;
