//! Cleanup of raw event lists into alternating in-use/available sequences.

use tracing::debug;
use usagewatch_types::{Event, Status};

use crate::parse::MachineEvents;

/// Seconds in one hour.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Default shift from UTC to local time, in hours.
///
/// This is a fixed offset: daylight saving time is not applied.
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = -6;

/// Orders, shifts and deduplicates events so they pair into intervals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sanitizer {
    utc_offset_hours: i32,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(DEFAULT_UTC_OFFSET_HOURS)
    }
}

impl Sanitizer {
    /// Create a sanitizer shifting times by a fixed number of hours.
    pub fn new(utc_offset_hours: i32) -> Self {
        Self { utc_offset_hours }
    }

    /// Offset applied to every event, in seconds.
    pub fn offset_secs(&self) -> f64 {
        f64::from(self.utc_offset_hours) * SECONDS_PER_HOUR
    }

    /// Sanitize every machine's events.
    pub fn sanitize(&self, events: MachineEvents) -> MachineEvents {
        events
            .into_iter()
            .map(|(machine, list)| {
                let before = list.len();
                let cleaned = self.sanitize_machine(list);
                debug!(machine = %machine, before, after = cleaned.len(), "sanitized events");
                (machine, cleaned)
            })
            .collect()
    }

    /// Sanitize one machine's events.
    ///
    /// The result alternates statuses and starts with [`Status::InUse`],
    /// or is empty.
    pub fn sanitize_machine(&self, mut events: Vec<Event>) -> Vec<Event> {
        events.sort_by(|a, b| a.time.total_cmp(&b.time));

        let offset = self.offset_secs();
        for event in &mut events {
            event.time += offset;
        }

        let mut events = collapse_repeats(events);
        if events.first().is_some_and(|e| e.status != Status::InUse) {
            events.remove(0);
        }
        events
    }
}

/// Keep only the first event of each run of identical statuses.
pub fn collapse_repeats(events: Vec<Event>) -> Vec<Event> {
    let mut kept: Vec<Event> = Vec::with_capacity(events.len());
    for event in events {
        if kept.last().is_some_and(|last| last.status == event.status) {
            continue;
        }
        kept.push(event);
    }
    kept
}
