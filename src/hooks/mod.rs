pub mod dispatcher;
pub mod event;
pub mod listener;

pub use dispatcher::{Hooks, DEFAULT_PRIORITY};
pub use event::{Event, Payload, Topic};
pub use listener::Listener;
