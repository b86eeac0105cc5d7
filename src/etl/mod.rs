pub mod builder;
pub mod control;
pub mod extract;
pub mod load;
pub mod transform;
pub mod types;

use tracing::{debug, debug_span, trace};

pub use builder::{Config, ConfigBuilder, EtlTool};
pub use control::{Counters, Decision, RunSummary};
pub use extract::{Extractor, FnExtractor, IntoPairs, Pairs, PassThrough};
pub use load::Loader;
pub use transform::{Cursor, FnTransformer, Identity, Transformed, Transformer};
pub use types::{EtlError, Key};

use crate::hooks::{Event, Hooks, Topic};
use control::ControlFlags;
use extract::Extraction;
use load::LoaderSlots;

/// A configured extract-transform-load pipeline.
///
/// `D` is the input handed to [`Etl::process`], `T` the extracted item type
/// and `U` the type of the transformed values given to the loader. Build one
/// with [`EtlTool`].
///
/// Stage callbacks and listeners steer the run through a [`Decision`]
/// (skip the current item, stop, force a flush). The engine merges those
/// decisions into its own flags after each call and checks them between
/// stages.
pub struct Etl<D, T, U = T> {
    pub(crate) extractor: Box<dyn Extractor<D, T>>,
    pub(crate) transformer: Box<dyn Transformer<T, U>>,
    pub(crate) slots: LoaderSlots<U>,
    pub(crate) hooks: Hooks<T>,
    pub(crate) flush_count: Option<usize>,
    pub(crate) control: ControlFlags,
    pub(crate) counters: Counters,
}

impl<D, T, U> Etl<D, T, U> {
    pub(crate) fn new(
        extractor: Box<dyn Extractor<D, T>>,
        transformer: Box<dyn Transformer<T, U>>,
        slots: LoaderSlots<U>,
        hooks: Hooks<T>,
        flush_count: Option<usize>,
    ) -> Self {
        Etl {
            extractor,
            transformer,
            slots,
            hooks,
            flush_count: flush_count.map(|n| n.max(1)),
            control: ControlFlags::default(),
            counters: Counters::default(),
        }
    }

    /// Runs the pipeline once over `input`.
    ///
    /// Items are pulled one at a time, transformed into a buffer and loaded.
    /// When the source is exhausted or a stop was requested, the pending
    /// batch is either committed or rolled back and `end` is dispatched.
    ///
    /// An error that no listener ignores aborts the run before that final
    /// reconciliation. [`Etl::counters`] then still reflects where it stopped.
    pub fn process(&mut self, input: D) -> Result<RunSummary, EtlError> {
        let span = debug_span!("etl_run", flush_count = ?self.flush_count);
        let _enter = span.enter();

        self.control.reset();
        self.counters = Counters::default();
        debug!("run started");
        self.emit(Event::start())?;

        let mut decision = Decision::default();
        let source = self.extractor.extract(input, &mut decision);
        self.control.apply(decision);
        let source = match source {
            Err(EtlError::NotIterable { found }) => {
                return Err(EtlError::ExtractContract { found });
            }
            other => other?,
        };

        let mut extraction = Extraction::new(source);
        let mut loader_ready = false;

        while let Some((key, item)) = extraction.pull(&mut self.hooks, &mut self.control)? {
            if self.control.skip {
                self.skip(item, key)?;
                continue;
            }
            if self.control.stop {
                break;
            }

            let transformed = self.transform(item, key)?;

            if self.control.skip {
                self.skip(item, key)?;
                continue;
            }
            if self.control.stop {
                break;
            }

            self.counters.since_flush += 1;
            self.counters.total += 1;
            trace!(key = %key, total = self.counters.total, "loading item");

            if !loader_ready {
                loader_ready = true;
                self.init_loader(item, key)?;
            }

            let need_flush = self
                .flush_count
                .is_some_and(|every| self.counters.total % every == 0);
            self.load(&transformed, item, key, need_flush)?;
        }

        self.end()
    }

    /// Counters of the current or last run.
    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn flush_count(&self) -> Option<usize> {
        self.flush_count
    }

    /// Listener registry, for subscribing after the pipeline was built or
    /// for raising `stop` from outside.
    pub fn hooks_mut(&mut self) -> &mut Hooks<T> {
        &mut self.hooks
    }

    /// Dispatches `event` and merges whatever listeners decided.
    pub(crate) fn emit(&mut self, mut event: Event<'_, T>) -> Result<(), EtlError> {
        let dispatched = self.hooks.dispatch(&mut event);
        self.control.apply(event.decision());
        dispatched
    }

    fn skip(&mut self, item: &T, key: &Key) -> Result<(), EtlError> {
        self.control.skip = false;
        trace!(key = %key, "item skipped");
        self.emit(Event::for_item(Topic::Skip, item, key))
    }

    fn end(&mut self) -> Result<RunSummary, EtlError> {
        let rolled_back = self.control.rollback_on_stop;
        if rolled_back {
            let pending = self.counters.since_flush;
            self.rollback()?;
            self.counters.total = self.counters.total.saturating_sub(pending);
        } else {
            self.flush(false)?;
        }

        let total = self.counters.total;
        self.emit(Event::end(total))?;
        self.control.reset();
        debug!(total, rolled_back, "run ended");

        Ok(RunSummary { total, rolled_back })
    }
}

#[cfg(test)]
mod tests;
