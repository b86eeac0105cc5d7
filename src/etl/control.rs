/// Control decision handed to a stage callback or carried by a hook event.
///
/// Callbacks and listeners never touch the engine directly. They record what
/// they want in a `Decision`, and the engine merges it into its control flags
/// once the call (or the whole dispatch) has returned. Decisions only ever
/// raise flags; clearing is the engine's job.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    skip: bool,
    stop: Option<bool>,
    flush: bool,
}

impl Decision {
    /// Discard the current item; it will not be loaded.
    pub fn skip_current_item(&mut self) {
        self.skip = true;
    }

    /// Stop pulling items once the current one is done.
    ///
    /// With `rollback` set, the run ends with a rollback of everything loaded
    /// since the last flush instead of a final flush.
    pub fn stop_process(&mut self, rollback: bool) {
        self.stop = Some(rollback);
    }

    /// Flush right after the current item's load, whatever the threshold.
    pub fn trigger_flush(&mut self) {
        self.flush = true;
    }

    pub fn is_skip(&self) -> bool {
        self.skip
    }

    pub fn is_stop(&self) -> bool {
        self.stop.is_some()
    }

    pub fn is_flush(&self) -> bool {
        self.flush
    }

    pub fn is_empty(&self) -> bool {
        *self == Decision::default()
    }
}

/// Flags owned by the engine for the duration of one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ControlFlags {
    pub(crate) skip: bool,
    pub(crate) stop: bool,
    pub(crate) rollback_on_stop: bool,
    pub(crate) force_flush: bool,
}

impl ControlFlags {
    pub(crate) fn reset(&mut self) {
        *self = ControlFlags::default();
    }

    pub(crate) fn apply(&mut self, decision: Decision) {
        if decision.skip {
            self.skip = true;
        }
        if let Some(rollback) = decision.stop {
            self.stop = true;
            self.rollback_on_stop = rollback;
        }
        if decision.flush {
            self.force_flush = true;
        }
    }
}

/// Item counters of the current (or last) run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    /// Items loaded since the last flush or rollback.
    pub since_flush: usize,
    /// Items advanced past the transform stage and not taken back by a
    /// failed load or the final rollback.
    pub total: usize,
}

/// Outcome of a run that reached end-of-run reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Total reported with the `end` event.
    pub total: usize,
    pub rolled_back: bool,
}
