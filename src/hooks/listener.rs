// src/hooks/listener.rs

use crate::etl::EtlError;

use super::event::Event;

/// Subscriber of a [`Topic`](super::Topic), registered on [`Hooks`](super::Hooks).
///
/// Listeners may record decisions on the event (skip, stop, flush, ignore an
/// exception) or stop its propagation. An `Err` halts the dispatch and is
/// returned to the engine. Any `FnMut(&mut Event<T>)` closure is a listener.
///
/// ```rust
/// use etl_pipeline::etl::{EtlError, Key};
/// use etl_pipeline::hooks::{Event, Hooks, Listener, Topic};
///
/// struct SkipOdd;
///
/// impl Listener<u32> for SkipOdd {
///     fn handle(&mut self, event: &mut Event<'_, u32>) -> Result<(), EtlError> {
///         if event.item().is_some_and(|n| n % 2 == 1) {
///             event.skip_current_item();
///         }
///         Ok(())
///     }
/// }
///
/// let mut hooks = Hooks::new();
/// hooks.subscribe(Topic::Extract, 0, SkipOdd);
///
/// let key = Key::Index(0);
/// let mut event = Event::for_item(Topic::Extract, &7, &key);
/// hooks.dispatch(&mut event).unwrap();
/// assert!(event.decision().is_skip());
/// ```
pub trait Listener<T> {
    fn handle(&mut self, event: &mut Event<'_, T>) -> Result<(), EtlError>;
}

impl<T, F> Listener<T> for F
where
    F: FnMut(&mut Event<'_, T>) -> Result<(), EtlError>,
{
    fn handle(&mut self, event: &mut Event<'_, T>) -> Result<(), EtlError> {
        self(event)
    }
}
