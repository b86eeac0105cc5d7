use crate::etl::{Cursor, Decision, EtlError, Key, Loader};

/// Drains its input and keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLoader;

impl<U> Loader<U> for NullLoader {
    fn load(&mut self, pairs: Cursor<'_, U>, _key: &Key, _decision: &mut Decision) -> Result<(), EtlError> {
        pairs.for_each(drop);
        Ok(())
    }
}
