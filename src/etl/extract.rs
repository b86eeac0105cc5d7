use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use tracing::{debug, warn};

use super::control::{ControlFlags, Decision};
use super::types::{EtlError, Key};
use crate::hooks::{Event, Hooks, Topic};

/// Lazy sequence of `(key, value)` pairs.
///
/// Produced by an extraction source or by a transformer. Pulling an `Err`
/// means the underlying producer failed.
pub struct Pairs<T> {
    inner: Box<dyn Iterator<Item = Result<(Key, T), EtlError>>>,
}

impl<T: 'static> Pairs<T> {
    pub fn from_results<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Result<(Key, T), EtlError>>,
        I::IntoIter: 'static,
    {
        Pairs {
            inner: Box::new(iter.into_iter()),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (Key, T)>,
        I::IntoIter: 'static,
    {
        Self::from_results(iter.into_iter().map(Ok))
    }

    /// Values keyed by their position, starting at 0.
    pub fn indexed<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Self::from_iter(
            values
                .into_iter()
                .enumerate()
                .map(|(i, value)| (Key::Index(i), value)),
        )
    }

    pub fn once(key: Key, value: T) -> Self {
        Self::from_iter(std::iter::once((key, value)))
    }

    pub fn empty() -> Self {
        Self::from_results(std::iter::empty())
    }
}

impl Pairs<Value> {
    /// Iterates a JSON array (ordinal keys) or object (named keys).
    ///
    /// Anything else, `null` included, is not a sequence.
    pub fn try_from_json(value: Value) -> Result<Self, EtlError> {
        match value {
            Value::Array(values) => Ok(Pairs::indexed(values)),
            Value::Object(map) => Ok(Pairs::from_iter(
                map.into_iter().map(|(name, value)| (Key::Name(name), value)),
            )),
            other => Err(EtlError::NotIterable {
                found: json_kind(&other),
            }),
        }
    }
}

impl<T> Iterator for Pairs<T> {
    type Item = Result<(Key, T), EtlError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<T> fmt::Debug for Pairs<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pairs").finish_non_exhaustive()
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Conversion of an extraction result into a sequence of pairs.
///
/// `Ok(None)` stands for "nothing to extract" and is treated as an empty
/// sequence. Values that cannot be iterated fail with
/// [`EtlError::NotIterable`].
pub trait IntoPairs<T> {
    fn into_pairs(self) -> Result<Option<Pairs<T>>, EtlError>;
}

impl<T> IntoPairs<T> for Pairs<T> {
    fn into_pairs(self) -> Result<Option<Pairs<T>>, EtlError> {
        Ok(Some(self))
    }
}

impl<T> IntoPairs<T> for () {
    fn into_pairs(self) -> Result<Option<Pairs<T>>, EtlError> {
        Ok(None)
    }
}

impl<T, P: IntoPairs<T>> IntoPairs<T> for Option<P> {
    fn into_pairs(self) -> Result<Option<Pairs<T>>, EtlError> {
        match self {
            Some(inner) => inner.into_pairs(),
            None => Ok(None),
        }
    }
}

impl<T: 'static> IntoPairs<T> for Vec<T> {
    fn into_pairs(self) -> Result<Option<Pairs<T>>, EtlError> {
        Ok(Some(Pairs::indexed(self)))
    }
}

impl<T: 'static, const N: usize> IntoPairs<T> for [T; N] {
    fn into_pairs(self) -> Result<Option<Pairs<T>>, EtlError> {
        Ok(Some(Pairs::indexed(self)))
    }
}

impl<T: 'static> IntoPairs<T> for BTreeMap<String, T> {
    fn into_pairs(self) -> Result<Option<Pairs<T>>, EtlError> {
        Ok(Some(Pairs::from_iter(
            self.into_iter().map(|(name, value)| (Key::Name(name), value)),
        )))
    }
}

impl IntoPairs<Value> for Value {
    fn into_pairs(self) -> Result<Option<Pairs<Value>>, EtlError> {
        match self {
            Value::Null => Ok(None),
            other => Pairs::try_from_json(other).map(Some),
        }
    }
}

/// Turns the input of a run into the sequence of items to process.
pub trait Extractor<D, T> {
    fn extract(&mut self, input: D, decision: &mut Decision)
        -> Result<Option<Pairs<T>>, EtlError>;
}

/// Extraction used when no extractor is configured: the input already is
/// the sequence.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl<D, T> Extractor<D, T> for PassThrough
where
    D: IntoPairs<T>,
{
    fn extract(&mut self, input: D, _decision: &mut Decision) -> Result<Option<Pairs<T>>, EtlError> {
        input.into_pairs()
    }
}

/// Adapts a bare function into an [`Extractor`].
pub struct FnExtractor<F>(pub F);

impl<D, T, F, R> Extractor<D, T> for FnExtractor<F>
where
    F: FnMut(D, &mut Decision) -> Result<R, EtlError>,
    R: IntoPairs<T>,
{
    fn extract(&mut self, input: D, decision: &mut Decision) -> Result<Option<Pairs<T>>, EtlError> {
        (self.0)(input, decision)?.into_pairs()
    }
}

/// Pull side of the extraction stage for one run.
///
/// Owns the source sequence and the last item pulled from it, which is what
/// an `extract-exception` event reports.
pub(crate) struct Extraction<T> {
    source: Option<Pairs<T>>,
    current: Option<(Key, T)>,
}

impl<T> Extraction<T> {
    pub(crate) fn new(source: Option<Pairs<T>>) -> Self {
        Extraction {
            source,
            current: None,
        }
    }

    /// Pulls the next item that survived its `extract` event.
    ///
    /// Items whose `extract` dispatch fails with a recoverable error are
    /// dropped. A failing source (or a fatal listener error) ends extraction
    /// through `extract-exception`.
    pub(crate) fn pull(
        &mut self,
        hooks: &mut Hooks<T>,
        control: &mut ControlFlags,
    ) -> Result<Option<(&Key, &T)>, EtlError> {
        loop {
            let Some(source) = self.source.as_mut() else {
                return Ok(None);
            };

            let pair = match source.next() {
                None => {
                    self.source = None;
                    return Ok(None);
                }
                Some(Err(error)) => {
                    self.source = None;
                    self.fail(error, hooks, control)?;
                    return Ok(None);
                }
                Some(Ok(pair)) => pair,
            };

            control.skip = false;
            let (key, item) = &*self.current.insert(pair);
            let mut event = Event::for_item(Topic::Extract, item, key);
            let dispatched = hooks.dispatch(&mut event);
            control.apply(event.decision());

            match dispatched {
                Ok(()) => break,
                Err(error) if error.is_recoverable() => {
                    debug!(key = %key, %error, "dropping item after extract listener failure");
                }
                Err(error) => {
                    self.source = None;
                    self.fail(error, hooks, control)?;
                    return Ok(None);
                }
            }
        }

        Ok(self.current.as_ref().map(|(key, item)| (key, item)))
    }

    fn fail(
        &self,
        error: EtlError,
        hooks: &mut Hooks<T>,
        control: &mut ControlFlags,
    ) -> Result<(), EtlError> {
        let (item, key) = match &self.current {
            Some((key, item)) => (Some(item), Some(key)),
            None => (None, None),
        };

        let mut event = Event::for_failure(Topic::ExtractException, item, key, &error);
        let dispatched = hooks.dispatch(&mut event);
        control.apply(event.decision());
        dispatched?;

        if event.should_throw() {
            return Err(error);
        }
        warn!(%error, "extraction error ignored by listener");
        Ok(())
    }
}
