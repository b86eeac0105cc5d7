use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};

use super::control::Decision;
use super::transform::{Cursor, Transformed};
use super::types::{EtlError, Key};
use super::Etl;
use crate::hooks::{Event, Topic};

/// Sink of a pipeline, with optional batch commit and compensation.
///
/// Only [`Loader::load`] is required; `init`, `commit` and `rollback`
/// default to no-ops.
pub trait Loader<U> {
    /// Called once per run, before the first load.
    fn init(&mut self) -> Result<(), EtlError> {
        Ok(())
    }

    fn load(&mut self, pairs: Cursor<'_, U>, key: &Key, decision: &mut Decision) -> Result<(), EtlError>;

    /// Commits what was loaded since the last commit. `partial` is true for
    /// mid-run commits and false for the final one.
    fn commit(&mut self, _partial: bool) -> Result<(), EtlError> {
        Ok(())
    }

    /// Discards what was loaded since the last commit.
    fn rollback(&mut self) -> Result<(), EtlError> {
        Ok(())
    }
}

impl<U, L: Loader<U>> Loader<U> for Rc<RefCell<L>> {
    fn init(&mut self) -> Result<(), EtlError> {
        self.borrow_mut().init()
    }

    fn load(&mut self, pairs: Cursor<'_, U>, key: &Key, decision: &mut Decision) -> Result<(), EtlError> {
        self.borrow_mut().load(pairs, key, decision)
    }

    fn commit(&mut self, partial: bool) -> Result<(), EtlError> {
        self.borrow_mut().commit(partial)
    }

    fn rollback(&mut self) -> Result<(), EtlError> {
        self.borrow_mut().rollback()
    }
}

pub(crate) type InitSlot = Box<dyn FnMut() -> Result<(), EtlError>>;
pub(crate) type LoadSlot<U> = Box<dyn FnMut(Cursor<'_, U>, &Key, &mut Decision) -> Result<(), EtlError>>;
pub(crate) type CommitSlot = Box<dyn FnMut(bool) -> Result<(), EtlError>>;
pub(crate) type RollbackSlot = Box<dyn FnMut() -> Result<(), EtlError>>;

/// The four raw loader callbacks the engine drives.
///
/// A slot left empty turns the matching step into a no-op: no callback, no
/// event and no counter reset.
pub(crate) struct LoaderSlots<U> {
    pub(crate) init: Option<InitSlot>,
    pub(crate) load: LoadSlot<U>,
    pub(crate) commit: Option<CommitSlot>,
    pub(crate) rollback: Option<RollbackSlot>,
}

impl<U: 'static> LoaderSlots<U> {
    /// Wires every method of `loader` into its slot.
    pub(crate) fn from_loader<L>(loader: L) -> Self
    where
        L: Loader<U> + 'static,
    {
        let shared = Rc::new(RefCell::new(loader));

        let init = Rc::clone(&shared);
        let load = Rc::clone(&shared);
        let commit = Rc::clone(&shared);
        let rollback = shared;

        LoaderSlots {
            init: Some(Box::new(move || init.borrow_mut().init())),
            load: Box::new(move |pairs: Cursor<'_, U>, key: &Key, decision: &mut Decision| {
                load.borrow_mut().load(pairs, key, decision)
            }),
            commit: Some(Box::new(move |partial: bool| commit.borrow_mut().commit(partial))),
            rollback: Some(Box::new(move || rollback.borrow_mut().rollback())),
        }
    }
}

impl<D, T, U> Etl<D, T, U> {
    pub(crate) fn init_loader(&mut self, item: &T, key: &Key) -> Result<(), EtlError> {
        self.emit(Event::for_item(Topic::LoaderInit, item, key))?;
        match self.slots.init.as_mut() {
            Some(init) => init(),
            None => Ok(()),
        }
    }

    /// Hands the buffered output to the loader, then flushes if asked to.
    ///
    /// The orchestrator counted the item before calling; a failed attempt
    /// takes that count back whether or not a listener ignores the error.
    pub(crate) fn load(
        &mut self,
        transformed: &Transformed<U>,
        item: &T,
        key: &Key,
        need_flush: bool,
    ) -> Result<(), EtlError> {
        let mut decision = Decision::default();
        let mut outcome = (self.slots.load)(transformed.cursor(), key, &mut decision);
        self.control.apply(decision);
        if outcome.is_ok() {
            outcome = self.emit(Event::for_item(Topic::Load, item, key));
        }

        if let Err(error) = outcome {
            self.counters.since_flush -= 1;
            self.counters.total -= 1;

            let mut event = Event::for_failure(Topic::LoadException, Some(item), Some(key), &error);
            let dispatched = self.hooks.dispatch(&mut event);
            self.control.apply(event.decision());
            dispatched?;

            if event.should_throw() {
                return Err(error);
            }
            warn!(key = %key, %error, "load error ignored by listener");
        }

        if self.control.force_flush || need_flush {
            self.flush(true)?;
        }
        Ok(())
    }

    pub(crate) fn flush(&mut self, partial: bool) -> Result<(), EtlError> {
        let Some(commit) = self.slots.commit.as_mut() else {
            return Ok(());
        };
        commit(partial)?;

        let counter = self.counters.since_flush;
        debug!(counter, partial, "flushed");
        self.emit(Event::flush(counter, partial))?;
        self.counters.since_flush = 0;
        self.control.force_flush = false;
        Ok(())
    }

    pub(crate) fn rollback(&mut self) -> Result<(), EtlError> {
        let Some(rollback) = self.slots.rollback.as_mut() else {
            return Ok(());
        };
        rollback()?;

        let counter = self.counters.since_flush;
        debug!(counter, "rolled back");
        self.emit(Event::rollback(counter))?;
        self.counters.since_flush = 0;
        Ok(())
    }
}
