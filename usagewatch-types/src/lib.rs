//! # usagewatch-types
//!
//! Core types for machine usage tracking. A notifier bot posts "machine X is
//! now in use / available" messages to a chat channel; these types describe
//! the messages, the status transitions parsed from them, the usage intervals
//! those transitions bound, and the hour-of-week occupancy histogram that is
//! finally published.
//!
//! ## Features
//!
//! - `serde`: JSON serialization of messages, events, and histograms
//!
//! ## Example
//!
//! ```rust
//! use usagewatch_types::{UsageHistogram, Weekday, WeeklyUsage};
//!
//! let mut week = WeeklyUsage::new();
//! week.set(Weekday::Tuesday, 18, 0.5);
//!
//! let mut histogram = UsageHistogram::new(1_700_000_000);
//! histogram.insert("laser", week);
//!
//! assert_eq!(histogram.get("laser").unwrap().get(Weekday::Tuesday, 18), 0.5);
//! ```

mod event;
mod histogram;
mod weekday;

pub use event::*;
pub use histogram::*;
pub use weekday::*;

/// Hours tracked per day in a [`WeeklyUsage`].
pub const HOURS_PER_DAY: usize = 24;

/// Days tracked per week in a [`WeeklyUsage`].
pub const DAYS_PER_WEEK: usize = 7;
