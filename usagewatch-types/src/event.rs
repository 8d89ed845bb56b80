//! Chat messages, status transitions, and usage intervals.

use core::fmt;

/// A chat message as returned by the history API.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    /// Display name of the posting bot or user, if the API reported one.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub sender_name: Option<String>,

    /// Message body.
    pub text: String,

    /// Unix timestamp in seconds (fractional).
    pub timestamp: f64,
}

impl Message {
    /// Create a message from a known sender.
    pub fn new(sender_name: impl Into<String>, text: impl Into<String>, timestamp: f64) -> Self {
        Self {
            sender_name: Some(sender_name.into()),
            text: text.into(),
            timestamp,
        }
    }

    /// Whether this message was posted under the given sender name.
    pub fn is_from(&self, sender_name: &str) -> bool {
        self.sender_name.as_deref() == Some(sender_name)
    }
}

/// Machine status announced by the notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Status {
    Available,
    InUse,
}

impl Status {
    /// The phrase the notifier uses for this status.
    pub const fn phrase(self) -> &'static str {
        match self {
            Status::Available => "available",
            Status::InUse => "in use",
        }
    }

    /// Match the leading phrase of `text` against the known statuses.
    pub fn from_prefix(text: &str) -> Option<Self> {
        [Status::Available, Status::InUse]
            .into_iter()
            .find(|status| text.starts_with(status.phrase()))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

/// A single status transition for one machine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    pub machine: String,
    pub status: Status,
    /// Unix timestamp in seconds. Shifted to local time once sanitized.
    pub time: f64,
}

impl Event {
    pub fn new(machine: impl Into<String>, status: Status, time: f64) -> Self {
        Self {
            machine: machine.into(),
            status,
            time,
        }
    }
}

/// A contiguous span during which a machine was in use.
///
/// Times are whole seconds; `start` is in the same shifted clock as the
/// events it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    pub machine: String,
    pub start: i64,
    pub duration: u64,
}

impl Interval {
    /// Build an interval between an in-use and the following available event.
    ///
    /// Fractional seconds are floored. A negative span (out-of-order input)
    /// yields a zero duration.
    pub fn between(start: &Event, end: &Event) -> Self {
        let duration = (end.time - start.time).floor().max(0.0) as u64;
        Self {
            machine: start.machine.clone(),
            start: start.time.floor() as i64,
            duration,
        }
    }

    /// Second at which the machine became available again.
    pub fn end(&self) -> i64 {
        self.start + self.duration as i64
    }
}
