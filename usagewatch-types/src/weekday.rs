//! Day-of-week indexing for hour-of-week buckets.

use core::fmt;

/// Day of the week, Monday first.
///
/// The numeric index (Monday = 0 .. Sunday = 6) is the bucket row in a
/// [`WeeklyUsage`](crate::WeeklyUsage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All days in bucket order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Day for a Monday-based index. Indices past 6 wrap around.
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 7]
    }

    /// Monday-based index of this day.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The following day, wrapping Sunday to Monday.
    pub const fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// English name, as used for keys in the published histogram.
    pub const fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Look up a day by its English name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.name() == name)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_wraps_sunday_to_monday() {
        assert_eq!(Weekday::Saturday.next(), Weekday::Sunday);
        assert_eq!(Weekday::Sunday.next(), Weekday::Monday);
    }

    #[test]
    fn test_index_round_trip() {
        for day in Weekday::ALL {
            assert_eq!(Weekday::from_index(day.index()), day);
        }
        assert_eq!(Weekday::from_index(9), Weekday::Wednesday);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Weekday::from_name("Friday"), Some(Weekday::Friday));
        assert_eq!(Weekday::from_name("friday"), None);
    }
}
