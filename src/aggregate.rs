//! Conversion of sanitized events into a normalized hour-of-week histogram.
//!
//! ```text
//! in use ──────────── available        (one Interval)
//!     │ 20m │   60m   │ 10m │
//!     ▼     ▼         ▼     ▼
//!   hour N  hour N+1  hour N+2         (BucketShare per hour touched)
//!                 │
//!                 ▼
//!   seconds / (3600 × weeks), floored to 0.01
//! ```

use chrono::{DateTime, Datelike, Timelike};
use tracing::{debug, warn};
use usagewatch_types::{
    Event, Interval, UsageHistogram, Weekday, WeeklyUsage, DAYS_PER_WEEK, HOURS_PER_DAY,
};

use crate::parse::MachineEvents;

/// Seconds in one hour bucket.
pub const SECONDS_PER_HOUR: u64 = 3600;

/// Seconds of an interval attributed to one hour-of-week bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketShare {
    pub day: Weekday,
    pub hour: usize,
    pub seconds: u64,
}

/// Raw occupied seconds per hour-of-week for one machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupiedSeconds {
    buckets: [[u64; HOURS_PER_DAY]; DAYS_PER_WEEK],
}

impl OccupiedSeconds {
    /// Add one share to its bucket.
    pub fn add(&mut self, share: BucketShare) {
        self.buckets[share.day.index()][share.hour] += share.seconds;
    }

    /// Seconds accumulated in a bucket.
    pub fn get(&self, day: Weekday, hour: usize) -> u64 {
        self.buckets[day.index()][hour]
    }

    /// Seconds accumulated across the whole week.
    pub fn total(&self) -> u64 {
        self.buckets.iter().flatten().sum()
    }

    /// Convert to fractions of the `weeks` hours each bucket could have been
    /// occupied, floored to two decimal places.
    pub fn normalize(&self, weeks: u32) -> WeeklyUsage {
        let max_seconds = SECONDS_PER_HOUR * u64::from(weeks.max(1));
        let mut usage = WeeklyUsage::new();
        for day in Weekday::ALL {
            for hour in 0..HOURS_PER_DAY {
                let hundredths = self.get(day, hour) * 100 / max_seconds;
                usage.set(day, hour, hundredths as f64 / 100.0);
            }
        }
        usage
    }
}

/// Day of week and hour of day for a Unix timestamp read as UTC.
///
/// Returns `None` for timestamps outside the representable date range.
pub fn hour_of_week(timestamp: i64) -> Option<(Weekday, usize)> {
    let time = DateTime::from_timestamp(timestamp, 0)?;
    let day = Weekday::from_index(time.weekday().num_days_from_monday() as usize);
    Some((day, time.hour() as usize))
}

/// Pair an alternating event list into intervals.
///
/// Events at indices (0, 1), (2, 3), ... bound one interval each; a trailing
/// unmatched event is ignored.
pub fn pair_intervals(events: &[Event]) -> Vec<Interval> {
    events
        .chunks_exact(2)
        .map(|pair| Interval::between(&pair[0], &pair[1]))
        .collect()
}

/// Split an interval across the hour buckets it overlaps.
///
/// The shares always sum to the interval's duration.
pub fn split_by_hour(interval: &Interval) -> Vec<BucketShare> {
    let Some((mut day, mut hour)) = hour_of_week(interval.start) else {
        warn!(machine = %interval.machine, start = interval.start, "interval start out of range");
        return Vec::new();
    };

    let mut shares = Vec::new();
    let mut remaining = interval.duration;
    let mut capacity = SECONDS_PER_HOUR - interval.start.rem_euclid(SECONDS_PER_HOUR as i64) as u64;

    while remaining > 0 {
        let seconds = remaining.min(capacity);
        shares.push(BucketShare { day, hour, seconds });
        remaining -= seconds;
        capacity = SECONDS_PER_HOUR;

        hour += 1;
        if hour == HOURS_PER_DAY {
            hour = 0;
            day = day.next();
        }
    }

    shares
}

/// Builds the weekly occupancy histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregator {
    weeks: u32,
}

impl Aggregator {
    /// Create an aggregator normalizing over a lookback of `weeks` (at least 1).
    pub fn new(weeks: u32) -> Self {
        Self {
            weeks: weeks.max(1),
        }
    }

    /// Lookback used for normalization.
    pub fn weeks(&self) -> u32 {
        self.weeks
    }

    /// Accumulate raw occupied seconds for one machine's sanitized events.
    pub fn occupied_seconds(&self, events: &[Event]) -> OccupiedSeconds {
        let mut occupied = OccupiedSeconds::default();
        for interval in pair_intervals(events) {
            for share in split_by_hour(&interval) {
                occupied.add(share);
            }
        }
        occupied
    }

    /// Build the histogram for every machine, stamped with `updated`.
    ///
    /// Machines keep the order of `events`. Machines without a complete
    /// interval are included with all-zero buckets; a machine named
    /// [`UPDATED_KEY`](usagewatch_types::UPDATED_KEY) is left out.
    pub fn aggregate(&self, events: &MachineEvents, updated: i64) -> UsageHistogram {
        let mut histogram = UsageHistogram::new(updated);
        for (machine, list) in events {
            if UsageHistogram::is_reserved_name(machine) {
                warn!(machine = %machine, "machine name clashes with the build time key, skipping");
                continue;
            }
            let occupied = self.occupied_seconds(list);
            debug!(machine = %machine, seconds = occupied.total(), "aggregated usage");
            histogram.insert(machine.clone(), occupied.normalize(self.weeks));
        }
        histogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usagewatch_types::Status;

    const HOUR: i64 = 3600;
    const DAY: i64 = 24 * HOUR;
    // 1970-01-01 was a Thursday.
    const THURSDAY: i64 = 0;
    const SUNDAY: i64 = 3 * DAY;

    fn interval(start: i64, duration: u64) -> Interval {
        Interval {
            machine: "bench1".to_string(),
            start,
            duration,
        }
    }

    fn share(day: Weekday, hour: usize, seconds: u64) -> BucketShare {
        BucketShare { day, hour, seconds }
    }

    #[test]
    fn test_hour_of_week() {
        assert_eq!(hour_of_week(THURSDAY), Some((Weekday::Thursday, 0)));
        assert_eq!(hour_of_week(SUNDAY + 23 * HOUR + 59), Some((Weekday::Sunday, 23)));
        assert_eq!(hour_of_week(-1), Some((Weekday::Wednesday, 23)));
    }

    #[test]
    fn test_split_ninety_minutes_from_minute_forty() {
        let shares = split_by_hour(&interval(THURSDAY + 10 * HOUR + 40 * 60, 90 * 60));
        assert_eq!(
            shares,
            vec![
                share(Weekday::Thursday, 10, 20 * 60),
                share(Weekday::Thursday, 11, 60 * 60),
                share(Weekday::Thursday, 12, 10 * 60),
            ]
        );
    }

    #[test]
    fn test_split_wraps_sunday_midnight_to_monday() {
        let shares = split_by_hour(&interval(SUNDAY + 23 * HOUR + 40 * 60, 90 * 60));
        assert_eq!(
            shares,
            vec![
                share(Weekday::Sunday, 23, 20 * 60),
                share(Weekday::Monday, 0, 60 * 60),
                share(Weekday::Monday, 1, 10 * 60),
            ]
        );
    }

    #[test]
    fn test_split_within_one_hour() {
        let shares = split_by_hour(&interval(THURSDAY + 5 * HOUR + 60, 600));
        assert_eq!(shares, vec![share(Weekday::Thursday, 5, 600)]);
    }

    #[test]
    fn test_split_exact_hour_aligned() {
        let shares = split_by_hour(&interval(THURSDAY + 5 * HOUR, 3600));
        assert_eq!(shares, vec![share(Weekday::Thursday, 5, 3600)]);
    }

    #[test]
    fn test_split_zero_duration() {
        assert!(split_by_hour(&interval(THURSDAY, 0)).is_empty());
    }

    #[test]
    fn test_split_preserves_duration() {
        let starts = [-21_600, 0, 1000, 2399, 3599, 86_399, 344_400, 1_700_000_123];
        let durations = [1, 59, 1200, 3600, 3601, 5400, 86_400, 200_000, 1_000_003];

        for &start in &starts {
            for &duration in &durations {
                let shares = split_by_hour(&interval(start, duration));
                let total: u64 = shares.iter().map(|s| s.seconds).sum();
                assert_eq!(total, duration, "start {} duration {}", start, duration);
                assert!(shares.iter().all(|s| s.seconds <= SECONDS_PER_HOUR));
            }
        }
    }

    #[test]
    fn test_pair_intervals_ignores_trailing_event() {
        let events = vec![
            Event::new("bench1", Status::InUse, 100.0),
            Event::new("bench1", Status::Available, 400.0),
            Event::new("bench1", Status::InUse, 1000.0),
        ];
        let intervals = pair_intervals(&events);
        assert_eq!(intervals, vec![interval(100, 300)]);
        assert!(pair_intervals(&events[..1]).is_empty());
    }

    #[test]
    fn test_normalize_truncates_to_hundredths() {
        let mut occupied = OccupiedSeconds::default();
        // 1044 / 3600 = 0.29 exactly; 3599 / 3600 = 0.9997...
        occupied.add(share(Weekday::Monday, 0, 1044));
        occupied.add(share(Weekday::Monday, 1, 3599));
        occupied.add(share(Weekday::Monday, 2, 3600));

        let usage = occupied.normalize(1);
        assert_eq!(usage.get(Weekday::Monday, 0), 0.29);
        assert_eq!(usage.get(Weekday::Monday, 1), 0.99);
        assert_eq!(usage.get(Weekday::Monday, 2), 1.0);

        let usage = occupied.normalize(6);
        // 3600 / 21600 = 0.1666...
        assert_eq!(usage.get(Weekday::Monday, 2), 0.16);
    }

    #[test]
    fn test_continuous_use_fills_every_bucket() {
        let weeks = 2;
        let events = vec![
            Event::new("m", Status::InUse, 0.0),
            Event::new("m", Status::Available, (weeks * 7 * DAY) as f64),
        ];

        let aggregator = Aggregator::new(weeks as u32);
        let usage = aggregator.occupied_seconds(&events).normalize(aggregator.weeks());
        assert!(usage.iter().all(|(_, _, value)| value == 1.0));
    }

    #[test]
    fn test_aggregate_includes_idle_machines() {
        let mut events = MachineEvents::new();
        events.insert(
            "bench1".to_string(),
            vec![
                Event::new("bench1", Status::InUse, (THURSDAY + 9 * HOUR) as f64),
                Event::new("bench1", Status::Available, (THURSDAY + 10 * HOUR) as f64),
            ],
        );
        events.insert("lathe".to_string(), vec![Event::new("lathe", Status::InUse, 5.0)]);

        let histogram = Aggregator::new(1).aggregate(&events, 42);
        assert_eq!(histogram.updated, 42);
        assert_eq!(histogram.len(), 2);
        assert_eq!(histogram.get("bench1").unwrap().get(Weekday::Thursday, 9), 1.0);
        assert!(histogram.get("lathe").unwrap().is_idle());
    }

    #[test]
    fn test_aggregate_is_repeatable() {
        let mut events = MachineEvents::new();
        events.insert(
            "bench1".to_string(),
            vec![
                Event::new("bench1", Status::InUse, 1000.0),
                Event::new("bench1", Status::Available, 9000.5),
            ],
        );

        let aggregator = Aggregator::new(6);
        let first = aggregator.aggregate(&events, 1);
        let second = aggregator.aggregate(&events, 2);
        assert_eq!(first.machines, second.machines);
    }

    #[test]
    fn test_aggregate_keeps_first_seen_order() {
        let mut events = MachineEvents::new();
        events.insert("zeta".to_string(), vec![Event::new("zeta", Status::InUse, 1.0)]);
        events.insert("alpha".to_string(), vec![Event::new("alpha", Status::InUse, 2.0)]);

        let histogram = Aggregator::new(1).aggregate(&events, 0);
        assert_eq!(histogram.machine_names().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_aggregate_skips_machine_named_updated() {
        let mut events = MachineEvents::new();
        events.insert(
            "updated".to_string(),
            vec![
                Event::new("updated", Status::InUse, 0.0),
                Event::new("updated", Status::Available, 3600.0),
            ],
        );
        events.insert("laser".to_string(), Vec::new());

        let histogram = Aggregator::new(1).aggregate(&events, 99);
        assert_eq!(histogram.machine_names().collect::<Vec<_>>(), vec!["laser"]);

        let json = serde_json::to_string(&histogram).unwrap();
        let parsed: UsageHistogram = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.updated, 99);
    }

    #[test]
    fn test_zero_weeks_is_clamped() {
        assert_eq!(Aggregator::new(0).weeks(), 1);
    }
}
