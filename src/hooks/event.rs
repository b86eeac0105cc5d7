use std::fmt;

use crate::etl::{Decision, EtlError, Key};

/// Named topics dispatched on the hook bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    Start,
    Extract,
    ExtractException,
    Transform,
    TransformException,
    LoaderInit,
    Load,
    LoadException,
    Skip,
    /// Never raised by the engine itself; embedders may dispatch it.
    Stop,
    Flush,
    Rollback,
    End,
}

impl Topic {
    pub const ALL: [Topic; 13] = [
        Topic::Start,
        Topic::Extract,
        Topic::ExtractException,
        Topic::Transform,
        Topic::TransformException,
        Topic::LoaderInit,
        Topic::Load,
        Topic::LoadException,
        Topic::Skip,
        Topic::Stop,
        Topic::Flush,
        Topic::Rollback,
        Topic::End,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Start => "start",
            Topic::Extract => "extract",
            Topic::ExtractException => "extract-exception",
            Topic::Transform => "transform",
            Topic::TransformException => "transform-exception",
            Topic::LoaderInit => "loader-init",
            Topic::Load => "load",
            Topic::LoadException => "load-exception",
            Topic::Skip => "skip",
            Topic::Stop => "stop",
            Topic::Flush => "flush",
            Topic::Rollback => "rollback",
            Topic::End => "end",
        }
    }

    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Topic::ExtractException | Topic::TransformException | Topic::LoadException
        )
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data carried by an [`Event`].
#[derive(Debug)]
pub enum Payload<'a, T> {
    Start,
    Item {
        item: &'a T,
        key: &'a Key,
    },
    Failure {
        item: Option<&'a T>,
        key: Option<&'a Key>,
        error: &'a EtlError,
    },
    Flush {
        counter: usize,
        partial: bool,
    },
    Rollback {
        counter: usize,
    },
    End {
        total: usize,
    },
}

/// Event handed to every listener of a topic, in priority order.
///
/// Besides the payload, an event is the listener's only way to influence
/// the run: through its [`Decision`] slot and, for `*-exception` topics,
/// [`Event::ignore_exception`].
#[derive(Debug)]
pub struct Event<'a, T> {
    topic: Topic,
    payload: Payload<'a, T>,
    decision: Decision,
    ignored: bool,
    propagation_stopped: bool,
}

impl<'a, T> Event<'a, T> {
    pub fn new(topic: Topic, payload: Payload<'a, T>) -> Self {
        Event {
            topic,
            payload,
            decision: Decision::default(),
            ignored: false,
            propagation_stopped: false,
        }
    }

    pub fn start() -> Self {
        Event::new(Topic::Start, Payload::Start)
    }

    pub fn for_item(topic: Topic, item: &'a T, key: &'a Key) -> Self {
        Event::new(topic, Payload::Item { item, key })
    }

    pub fn for_failure(
        topic: Topic,
        item: Option<&'a T>,
        key: Option<&'a Key>,
        error: &'a EtlError,
    ) -> Self {
        Event::new(topic, Payload::Failure { item, key, error })
    }

    pub fn flush(counter: usize, partial: bool) -> Self {
        Event::new(Topic::Flush, Payload::Flush { counter, partial })
    }

    pub fn rollback(counter: usize) -> Self {
        Event::new(Topic::Rollback, Payload::Rollback { counter })
    }

    pub fn end(total: usize) -> Self {
        Event::new(Topic::End, Payload::End { total })
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn payload(&self) -> &Payload<'a, T> {
        &self.payload
    }

    pub fn item(&self) -> Option<&'a T> {
        match self.payload {
            Payload::Item { item, .. } => Some(item),
            Payload::Failure { item, .. } => item,
            _ => None,
        }
    }

    pub fn key(&self) -> Option<&'a Key> {
        match self.payload {
            Payload::Item { key, .. } => Some(key),
            Payload::Failure { key, .. } => key,
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&'a EtlError> {
        match self.payload {
            Payload::Failure { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Counter of a `flush` or `rollback` event, total of an `end` event.
    pub fn counter(&self) -> Option<usize> {
        match self.payload {
            Payload::Flush { counter, .. } | Payload::Rollback { counter } => Some(counter),
            Payload::End { total } => Some(total),
            _ => None,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self.payload, Payload::Flush { partial: true, .. })
    }

    pub fn skip_current_item(&mut self) {
        self.decision.skip_current_item();
    }

    pub fn stop_process(&mut self, rollback: bool) {
        self.decision.stop_process(rollback);
    }

    pub fn trigger_flush(&mut self) {
        self.decision.trigger_flush();
    }

    /// Suppresses the rethrow of the error carried by a `*-exception` event
    /// and discards the current item from loading.
    pub fn ignore_exception(&mut self) {
        self.ignored = true;
        self.decision.skip_current_item();
    }

    pub fn should_throw(&self) -> bool {
        !self.ignored
    }

    /// Keeps lower-priority listeners from seeing this event.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn decision(&self) -> Decision {
        self.decision
    }
}
