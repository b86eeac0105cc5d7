use std::slice;

use tracing::{trace, warn};

use super::control::Decision;
use super::extract::Pairs;
use super::types::{EtlError, Key};
use super::Etl;
use crate::hooks::{Event, Topic};

/// Maps one extracted item to zero or more output pairs.
///
/// The returned [`Pairs`] is drained exactly once by the engine. Returning
/// [`EtlError::NotIterable`] instead of a sequence breaks the transform
/// contract and aborts the run.
pub trait Transformer<T, U> {
    fn transform(&mut self, item: &T, key: &Key, decision: &mut Decision)
        -> Result<Pairs<U>, EtlError>;
}

/// Default transformer: yields `(key, item)` once.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl<T: Clone + 'static> Transformer<T, T> for Identity {
    fn transform(&mut self, item: &T, key: &Key, _decision: &mut Decision) -> Result<Pairs<T>, EtlError> {
        Ok(Pairs::once(key.clone(), item.clone()))
    }
}

/// Adapts a bare function into a [`Transformer`].
pub struct FnTransformer<F>(pub F);

impl<T, U, F> Transformer<T, U> for FnTransformer<F>
where
    F: FnMut(&T, &Key, &mut Decision) -> Result<Pairs<U>, EtlError>,
{
    fn transform(&mut self, item: &T, key: &Key, decision: &mut Decision) -> Result<Pairs<U>, EtlError> {
        (self.0)(item, key, decision)
    }
}

/// Materialized output of one transform call.
///
/// The buffer never changes once built, so every [`Transformed::cursor`]
/// replays the same pairs without going back to the transformer.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed<U> {
    pairs: Vec<(Key, U)>,
}

impl<U> Transformed<U> {
    pub fn new(pairs: Vec<(Key, U)>) -> Self {
        Transformed { pairs }
    }

    pub fn cursor(&self) -> Cursor<'_, U> {
        Cursor {
            inner: self.pairs.iter(),
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn into_vec(self) -> Vec<(Key, U)> {
        self.pairs
    }
}

/// Fresh iterator over a [`Transformed`] buffer.
#[derive(Debug, Clone)]
pub struct Cursor<'a, U> {
    inner: slice::Iter<'a, (Key, U)>,
}

impl<'a, U> Iterator for Cursor<'a, U> {
    type Item = (&'a Key, &'a U);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<U> ExactSizeIterator for Cursor<'_, U> {}

impl<D, T, U> Etl<D, T, U> {
    /// Runs the transformer on one item and buffers everything it yields.
    ///
    /// A recoverable failure, whether raised by the transformer, while
    /// draining its output, or by a `transform` listener, goes through
    /// `transform-exception`. When a listener ignores it, the pairs buffered
    /// so far are returned and the item is flagged for skipping.
    pub(crate) fn transform(&mut self, item: &T, key: &Key) -> Result<Transformed<U>, EtlError> {
        let mut decision = Decision::default();
        let produced = self.transformer.transform(item, key, &mut decision);
        self.control.apply(decision);

        let produced = match produced {
            Err(EtlError::NotIterable { found }) => {
                return Err(EtlError::TransformContract { found });
            }
            other => other,
        };

        let mut buffer = Vec::new();
        let mut outcome = produced.and_then(|pairs| {
            for pair in pairs {
                buffer.push(pair?);
            }
            Ok(())
        });
        if outcome.is_ok() {
            outcome = self.emit(Event::for_item(Topic::Transform, item, key));
        }

        if let Err(error) = outcome {
            if !error.is_recoverable() {
                return Err(error);
            }

            let mut event = Event::for_failure(Topic::TransformException, Some(item), Some(key), &error);
            let dispatched = self.hooks.dispatch(&mut event);
            self.control.apply(event.decision());
            dispatched?;

            if event.should_throw() {
                return Err(error);
            }
            warn!(key = %key, %error, "transform error ignored by listener");
        }

        trace!(key = %key, outputs = buffer.len(), "transformed");
        Ok(Transformed::new(buffer))
    }
}
