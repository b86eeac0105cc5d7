use std::collections::HashMap;

use tracing::trace;

use crate::etl::EtlError;

use super::event::{Event, Topic};
use super::listener::Listener;

/// Priority given to listeners registered without an explicit one.
pub const DEFAULT_PRIORITY: i32 = 0;

struct Registered<T> {
    priority: i32,
    listener: Box<dyn Listener<T>>,
}

/// Synchronous publish-subscribe bus keyed by [`Topic`].
///
/// Listeners of a topic run in descending priority; listeners sharing a
/// priority run in registration order.
pub struct Hooks<T> {
    listeners: HashMap<Topic, Vec<Registered<T>>>,
}

impl<T> Default for Hooks<T> {
    fn default() -> Self {
        Hooks {
            listeners: HashMap::new(),
        }
    }
}

impl<T> Hooks<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<L>(&mut self, topic: Topic, priority: i32, listener: L)
    where
        L: Listener<T> + 'static,
    {
        let registered = self.listeners.entry(topic).or_default();
        let position = registered
            .iter()
            .position(|r| r.priority < priority)
            .unwrap_or(registered.len());
        registered.insert(
            position,
            Registered {
                priority,
                listener: Box::new(listener),
            },
        );
    }

    pub fn has_listeners(&self, topic: Topic) -> bool {
        self.listener_count(topic) > 0
    }

    pub fn listener_count(&self, topic: Topic) -> usize {
        self.listeners.get(&topic).map_or(0, Vec::len)
    }

    pub fn clear(&mut self, topic: Topic) {
        self.listeners.remove(&topic);
    }

    /// Runs every listener of the event's topic against it.
    ///
    /// Stops at the first listener error, which is returned as is, or when a
    /// listener stops propagation.
    pub fn dispatch(&mut self, event: &mut Event<'_, T>) -> Result<(), EtlError> {
        let Some(registered) = self.listeners.get_mut(&event.topic()) else {
            return Ok(());
        };

        trace!(topic = %event.topic(), listeners = registered.len(), "dispatching");
        for entry in registered.iter_mut() {
            if event.is_propagation_stopped() {
                break;
            }
            entry.listener.handle(event)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
