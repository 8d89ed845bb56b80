//! Hour-of-week occupancy histograms.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::{Weekday, DAYS_PER_WEEK, HOURS_PER_DAY};

/// Occupancy of one machine for each of the 168 hours of a week.
///
/// Values are fractions in `[0, 1]`: the share of that hour-of-week slot
/// the machine spent in use across the lookback window.
///
/// Serializes as an object keyed by weekday name (Monday first), each
/// holding 24 values starting at midnight.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "BTreeMap<String, Vec<f64>>")
)]
pub struct WeeklyUsage {
    days: [[f64; HOURS_PER_DAY]; DAYS_PER_WEEK],
}

impl WeeklyUsage {
    /// An all-zero week.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for a given day and hour (0-23).
    ///
    /// # Panics
    ///
    /// Panics if `hour` is 24 or more.
    pub fn get(&self, day: Weekday, hour: usize) -> f64 {
        self.days[day.index()][hour]
    }

    /// Set the value for a given day and hour (0-23).
    pub fn set(&mut self, day: Weekday, hour: usize, value: f64) {
        self.days[day.index()][hour] = value;
    }

    /// The 24 hourly values for one day.
    pub fn day(&self, day: Weekday) -> &[f64; HOURS_PER_DAY] {
        &self.days[day.index()]
    }

    /// Iterate over every `(day, hour, value)` slot in week order.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, usize, f64)> + '_ {
        Weekday::ALL.into_iter().flat_map(move |day| {
            self.days[day.index()]
                .iter()
                .enumerate()
                .map(move |(hour, value)| (day, hour, *value))
        })
    }

    /// Sum of all slots.
    pub fn total(&self) -> f64 {
        self.iter().map(|(_, _, value)| value).sum()
    }

    /// Whether every slot is zero.
    pub fn is_idle(&self) -> bool {
        self.iter().all(|(_, _, value)| value == 0.0)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for WeeklyUsage {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(DAYS_PER_WEEK))?;
        for day in Weekday::ALL {
            map.serialize_entry(day.name(), &self.days[day.index()][..])?;
        }
        map.end()
    }
}

impl TryFrom<BTreeMap<String, Vec<f64>>> for WeeklyUsage {
    type Error = String;

    fn try_from(days: BTreeMap<String, Vec<f64>>) -> Result<Self, Self::Error> {
        let mut usage = WeeklyUsage::new();
        for (name, hours) in days {
            let day = Weekday::from_name(&name).ok_or_else(|| format!("unknown weekday '{}'", name))?;
            if hours.len() != HOURS_PER_DAY {
                return Err(format!(
                    "{} has {} hourly values, expected {}",
                    name,
                    hours.len(),
                    HOURS_PER_DAY
                ));
            }
            usage.days[day.index()].copy_from_slice(&hours);
        }
        Ok(usage)
    }
}

/// Key holding the build time in the serialized histogram.
///
/// A machine with this name cannot be represented alongside it.
pub const UPDATED_KEY: &str = "updated";

/// Published occupancy statistics for every machine.
///
/// Serialized flat: one key per machine, in insertion order, plus an
/// [`UPDATED_KEY`] key holding the Unix time (seconds) at which the
/// histogram was built.
///
/// ```json
/// { "laser": { "Monday": [0.0, ...], ... }, "updated": 1700000000 }
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UsageHistogram {
    /// Weekly occupancy keyed by machine name.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub machines: IndexMap<String, WeeklyUsage>,

    /// Unix timestamp in seconds when this histogram was built.
    pub updated: i64,
}

impl UsageHistogram {
    /// Create an empty histogram stamped with `updated`.
    pub fn new(updated: i64) -> Self {
        Self {
            machines: IndexMap::new(),
            updated,
        }
    }

    /// Whether `machine` would collide with the [`UPDATED_KEY`] field.
    pub fn is_reserved_name(machine: &str) -> bool {
        machine == UPDATED_KEY
    }

    /// Add or replace the week for a machine.
    ///
    /// A new machine goes after those already present; replacing keeps its
    /// position.
    pub fn insert(&mut self, machine: impl Into<String>, usage: WeeklyUsage) {
        self.machines.insert(machine.into(), usage);
    }

    /// Weekly occupancy for a machine.
    pub fn get(&self, machine: &str) -> Option<&WeeklyUsage> {
        self.machines.get(machine)
    }

    /// Number of machines.
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    /// Whether no machine is present.
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    /// Machine names in insertion order.
    pub fn machine_names(&self) -> impl Iterator<Item = &str> {
        self.machines.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekly_usage_get_set() {
        let mut usage = WeeklyUsage::new();
        assert!(usage.is_idle());

        usage.set(Weekday::Sunday, 23, 0.25);
        assert_eq!(usage.get(Weekday::Sunday, 23), 0.25);
        assert_eq!(usage.day(Weekday::Sunday)[23], 0.25);
        assert_eq!(usage.total(), 0.25);
        assert!(!usage.is_idle());
    }

    #[test]
    fn test_iter_covers_every_slot_in_order() {
        let usage = WeeklyUsage::new();
        let slots: Vec<_> = usage.iter().collect();
        assert_eq!(slots.len(), 168);
        assert_eq!(slots[0].0, Weekday::Monday);
        assert_eq!(slots[0].1, 0);
        assert_eq!(slots[167].0, Weekday::Sunday);
        assert_eq!(slots[167].1, 23);
    }

    #[test]
    fn test_try_from_rejects_short_day() {
        let mut days = BTreeMap::new();
        days.insert("Monday".to_string(), vec![0.0; 3]);
        assert!(WeeklyUsage::try_from(days).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_weekly_usage_serializes_monday_first() {
        let mut usage = WeeklyUsage::new();
        usage.set(Weekday::Wednesday, 9, 0.5);

        let json = serde_json::to_string(&usage).unwrap();
        assert!(json.starts_with(r#"{"Monday":[0.0,"#));
        let tuesday = json.find("Tuesday").unwrap();
        let sunday = json.find("Sunday").unwrap();
        assert!(tuesday < sunday);

        let parsed: WeeklyUsage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, usage);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_histogram_json_shape() {
        let mut histogram = UsageHistogram::new(1_700_000_000);
        histogram.insert("laser", WeeklyUsage::new());

        let value = serde_json::to_value(&histogram).unwrap();
        assert_eq!(value["updated"], 1_700_000_000);
        assert_eq!(value["laser"]["Friday"].as_array().unwrap().len(), 24);

        let parsed: UsageHistogram = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, histogram);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_histogram_keeps_insertion_order() {
        let mut histogram = UsageHistogram::new(5);
        histogram.insert("zeta", WeeklyUsage::new());
        histogram.insert("alpha", WeeklyUsage::new());
        assert_eq!(histogram.machine_names().collect::<Vec<_>>(), vec!["zeta", "alpha"]);

        let json = serde_json::to_string(&histogram).unwrap();
        assert!(json.find("\"zeta\"").unwrap() < json.find("\"alpha\"").unwrap());
        assert!(json.find("\"alpha\"").unwrap() < json.find("\"updated\"").unwrap());

        let parsed: UsageHistogram = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.machine_names().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        assert_eq!(parsed.updated, 5);
    }

    #[test]
    fn test_reserved_name() {
        assert!(UsageHistogram::is_reserved_name("updated"));
        assert!(!UsageHistogram::is_reserved_name("Updated"));
        assert!(!UsageHistogram::is_reserved_name("laser"));
    }
}
