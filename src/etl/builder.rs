use derive_builder::Builder;
use serde::Deserialize;

use super::control::Decision;
use super::extract::{Extractor, FnExtractor, IntoPairs, Pairs, PassThrough};
use super::load::{CommitSlot, InitSlot, LoadSlot, Loader, LoaderSlots, RollbackSlot};
use super::transform::{Cursor, FnTransformer, Identity, Transformer};
use super::types::{EtlError, Key};
use super::Etl;
use crate::hooks::{Event, Hooks, Listener, Topic, DEFAULT_PRIORITY};

/// Run settings of a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder, Deserialize)]
#[builder(default, build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct Config {
    /// Commit every `flush_count` loaded items. `None` commits once, at the
    /// end of the run.
    #[builder(setter(strip_option))]
    pub flush_count: Option<usize>,
}

impl ConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.flush_count {
            Some(Some(0)) => Err("flush count must be a positive integer".to_string()),
            _ => Ok(()),
        }
    }
}

impl Config {
    /// Checks a config that did not go through [`ConfigBuilder`], such as a
    /// deserialized one.
    pub fn validate(&self) -> Result<(), EtlError> {
        if self.flush_count == Some(0) {
            return Err(EtlError::Config(
                "flush count must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

/// Assembles an [`Etl`] from stage objects, bare functions and listeners.
///
/// The extracted item type `T` is fixed by the constructor; the output type
/// `U` is fixed by [`EtlTool::transformer`] or [`EtlTool::transform_with`],
/// which therefore come before the loader.
///
/// ```rust
/// use etl_pipeline::etl::{EtlTool, Pairs};
/// use etl_pipeline::loader::ArrayLoader;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let sink = Rc::new(RefCell::new(ArrayLoader::new(false)));
/// let mut etl = EtlTool::<Vec<i32>, i32>::new()
///     .transform_with(|item: &i32, key, _decision| Ok(Pairs::once(key.clone(), item * 2)))
///     .loader(Rc::clone(&sink))
///     .build()
///     .unwrap();
///
/// etl.process(vec![1, 2, 3]).unwrap();
/// assert_eq!(sink.borrow().values(), vec![&2, &4, &6]);
/// ```
pub struct EtlTool<D, T, U = T> {
    extractor: Box<dyn Extractor<D, T>>,
    transformer: Box<dyn Transformer<T, U>>,
    init: Option<InitSlot>,
    load: Option<LoadSlot<U>>,
    commit: Option<CommitSlot>,
    rollback: Option<RollbackSlot>,
    hooks: Hooks<T>,
    config: Config,
}

impl<D, T> EtlTool<D, T, T>
where
    D: IntoPairs<T> + 'static,
    T: Clone + 'static,
{
    /// Pipeline whose input already is the sequence of items.
    pub fn new() -> Self {
        Self::with_extractor(PassThrough)
    }
}

impl<D, T> Default for EtlTool<D, T, T>
where
    D: IntoPairs<T> + 'static,
    T: Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<D, T> EtlTool<D, T, T>
where
    T: Clone + 'static,
{
    pub fn with_extractor<E>(extractor: E) -> Self
    where
        E: Extractor<D, T> + 'static,
    {
        EtlTool {
            extractor: Box::new(extractor),
            transformer: Box::new(Identity),
            init: None,
            load: None,
            commit: None,
            rollback: None,
            hooks: Hooks::new(),
            config: Config::default(),
        }
    }

    /// Extraction from a bare function. Whatever it returns is converted
    /// with [`IntoPairs`].
    pub fn extract_with<F, R>(extract: F) -> Self
    where
        F: FnMut(D, &mut Decision) -> Result<R, EtlError> + 'static,
        R: IntoPairs<T>,
        D: 'static,
    {
        Self::with_extractor(FnExtractor(extract))
    }
}

impl<D, T, U> EtlTool<D, T, U>
where
    D: 'static,
    T: 'static,
    U: 'static,
{
    /// Replaces the transformer, changing the output type.
    ///
    /// A load function set earlier is typed by the old output and is
    /// discarded; the init, commit and rollback slots are kept.
    pub fn transformer<V, X>(self, transformer: X) -> EtlTool<D, T, V>
    where
        X: Transformer<T, V> + 'static,
    {
        EtlTool {
            extractor: self.extractor,
            transformer: Box::new(transformer),
            init: self.init,
            load: None,
            commit: self.commit,
            rollback: self.rollback,
            hooks: self.hooks,
            config: self.config,
        }
    }

    pub fn transform_with<V, F>(self, transform: F) -> EtlTool<D, T, V>
    where
        F: FnMut(&T, &Key, &mut Decision) -> Result<Pairs<V>, EtlError> + 'static,
    {
        self.transformer(FnTransformer(transform))
    }

    /// Wires `init`, `load`, `commit` and `rollback` of `loader`.
    ///
    /// Pass an `Rc<RefCell<L>>` to keep a handle on the sink.
    pub fn loader<L>(mut self, loader: L) -> Self
    where
        L: Loader<U> + 'static,
    {
        let slots = LoaderSlots::from_loader(loader);
        self.init = slots.init;
        self.load = Some(slots.load);
        self.commit = slots.commit;
        self.rollback = slots.rollback;
        self
    }

    pub fn load_with<F>(mut self, load: F) -> Self
    where
        F: FnMut(Cursor<'_, U>, &Key, &mut Decision) -> Result<(), EtlError> + 'static,
    {
        self.load = Some(Box::new(load));
        self
    }

    pub fn loader_init<F>(mut self, init: F) -> Self
    where
        F: FnMut() -> Result<(), EtlError> + 'static,
    {
        self.init = Some(Box::new(init));
        self
    }

    /// Commit callback; receives `true` for mid-run commits.
    pub fn committer<F>(mut self, commit: F) -> Self
    where
        F: FnMut(bool) -> Result<(), EtlError> + 'static,
    {
        self.commit = Some(Box::new(commit));
        self
    }

    pub fn restorer<F>(mut self, rollback: F) -> Self
    where
        F: FnMut() -> Result<(), EtlError> + 'static,
    {
        self.rollback = Some(Box::new(rollback));
        self
    }

    pub fn flush_count(mut self, flush_count: usize) -> Self {
        self.config.flush_count = Some(flush_count);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn on<L>(mut self, topic: Topic, priority: i32, listener: L) -> Self
    where
        L: Listener<T> + 'static,
    {
        self.hooks.subscribe(topic, priority, listener);
        self
    }

    pub fn on_start<F>(self, listener: F) -> Self
    where
        F: FnMut(&mut Event<'_, T>) -> Result<(), EtlError> + 'static,
    {
        self.on(Topic::Start, DEFAULT_PRIORITY, listener)
    }

    pub fn on_extract<F>(self, listener: F) -> Self
    where
        F: FnMut(&mut Event<'_, T>) -> Result<(), EtlError> + 'static,
    {
        self.on(Topic::Extract, DEFAULT_PRIORITY, listener)
    }

    pub fn on_extract_exception<F>(self, listener: F) -> Self
    where
        F: FnMut(&mut Event<'_, T>) -> Result<(), EtlError> + 'static,
    {
        self.on(Topic::ExtractException, DEFAULT_PRIORITY, listener)
    }

    pub fn on_transform<F>(self, listener: F) -> Self
    where
        F: FnMut(&mut Event<'_, T>) -> Result<(), EtlError> + 'static,
    {
        self.on(Topic::Transform, DEFAULT_PRIORITY, listener)
    }

    pub fn on_transform_exception<F>(self, listener: F) -> Self
    where
        F: FnMut(&mut Event<'_, T>) -> Result<(), EtlError> + 'static,
    {
        self.on(Topic::TransformException, DEFAULT_PRIORITY, listener)
    }

    pub fn on_loader_init<F>(self, listener: F) -> Self
    where
        F: FnMut(&mut Event<'_, T>) -> Result<(), EtlError> + 'static,
    {
        self.on(Topic::LoaderInit, DEFAULT_PRIORITY, listener)
    }

    pub fn on_load<F>(self, listener: F) -> Self
    where
        F: FnMut(&mut Event<'_, T>) -> Result<(), EtlError> + 'static,
    {
        self.on(Topic::Load, DEFAULT_PRIORITY, listener)
    }

    pub fn on_load_exception<F>(self, listener: F) -> Self
    where
        F: FnMut(&mut Event<'_, T>) -> Result<(), EtlError> + 'static,
    {
        self.on(Topic::LoadException, DEFAULT_PRIORITY, listener)
    }

    pub fn on_skip<F>(self, listener: F) -> Self
    where
        F: FnMut(&mut Event<'_, T>) -> Result<(), EtlError> + 'static,
    {
        self.on(Topic::Skip, DEFAULT_PRIORITY, listener)
    }

    /// `stop` is never raised by the engine; see [`Etl::hooks_mut`].
    pub fn on_stop<F>(self, listener: F) -> Self
    where
        F: FnMut(&mut Event<'_, T>) -> Result<(), EtlError> + 'static,
    {
        self.on(Topic::Stop, DEFAULT_PRIORITY, listener)
    }

    pub fn on_flush<F>(self, listener: F) -> Self
    where
        F: FnMut(&mut Event<'_, T>) -> Result<(), EtlError> + 'static,
    {
        self.on(Topic::Flush, DEFAULT_PRIORITY, listener)
    }

    pub fn on_rollback<F>(self, listener: F) -> Self
    where
        F: FnMut(&mut Event<'_, T>) -> Result<(), EtlError> + 'static,
    {
        self.on(Topic::Rollback, DEFAULT_PRIORITY, listener)
    }

    pub fn on_end<F>(self, listener: F) -> Self
    where
        F: FnMut(&mut Event<'_, T>) -> Result<(), EtlError> + 'static,
    {
        self.on(Topic::End, DEFAULT_PRIORITY, listener)
    }

    pub fn build(self) -> Result<Etl<D, T, U>, EtlError> {
        self.config.validate()?;
        let load = self
            .load
            .ok_or_else(|| EtlError::Config("a loader is required".to_string()))?;

        let slots = LoaderSlots {
            init: self.init,
            load,
            commit: self.commit,
            rollback: self.rollback,
        };
        Ok(Etl::new(
            self.extractor,
            self.transformer,
            slots,
            self.hooks,
            self.config.flush_count,
        ))
    }
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;
