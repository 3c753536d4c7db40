//! In-process, non-persistent backend. Each collection sits behind one
//! reader/writer lock; reads share it, every write takes it exclusively.

mod events;
mod superusers;

pub use events::InMemoryEventRepository;
pub use superusers::InMemorySuperUserRepository;
