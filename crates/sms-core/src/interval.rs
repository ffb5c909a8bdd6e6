//! Half-open time intervals for mount and location actions.
//!
//! An action is active from its `begin_date` (inclusive) until its
//! `end_date` (exclusive). A missing end date means the action is
//! still active and is modelled as [`UpperBound::Unbounded`].

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Exclusive upper bound of an [`Interval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpperBound {
    Bounded(DateTime<Utc>),
    Unbounded,
}

impl UpperBound {
    pub fn from_option(end: Option<DateTime<Utc>>) -> Self {
        match end {
            Some(end) => Self::Bounded(end),
            None => Self::Unbounded,
        }
    }

    pub fn as_option(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Bounded(end) => Some(*end),
            Self::Unbounded => None,
        }
    }

    /// `true` if `instant` lies strictly before this bound.
    pub fn is_after(&self, instant: DateTime<Utc>) -> bool {
        match self {
            Self::Bounded(end) => instant < *end,
            Self::Unbounded => true,
        }
    }
}

impl Ord for UpperBound {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bounded(a), Self::Bounded(b)) => a.cmp(b),
            (Self::Bounded(_), Self::Unbounded) => Ordering::Less,
            (Self::Unbounded, Self::Bounded(_)) => Ordering::Greater,
            (Self::Unbounded, Self::Unbounded) => Ordering::Equal,
        }
    }
}

impl PartialOrd for UpperBound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Rejected bounds: the end does not lie after the begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("end_date {end} must be after begin_date {begin}")]
pub struct InvertedInterval {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A `[begin, end)` time interval with a possibly open end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    begin: DateTime<Utc>,
    end: UpperBound,
}

impl Interval {
    /// Build an interval from user input. The end, when given, must lie
    /// strictly after the begin.
    pub fn new(
        begin: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, InvertedInterval> {
        match end {
            Some(end) if end <= begin => Err(InvertedInterval { begin, end }),
            _ => Ok(Self {
                begin,
                end: UpperBound::from_option(end),
            }),
        }
    }

    /// Build an interval from already persisted bounds without
    /// re-checking their order.
    pub fn from_bounds(begin: DateTime<Utc>, end: UpperBound) -> Self {
        Self { begin, end }
    }

    pub fn begin(&self) -> DateTime<Utc> {
        self.begin
    }

    pub fn end(&self) -> UpperBound {
        self.end
    }

    pub fn is_open_ended(&self) -> bool {
        self.end == UpperBound::Unbounded
    }

    /// Two intervals overlap when they share at least one instant.
    /// Intervals that merely touch (`a.end == b.begin`) do not.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.end.is_after(other.begin) && other.end.is_after(self.begin)
    }

    /// `true` if every instant of `other` lies within `self`.
    ///
    /// An open-ended `other` is only contained by an open-ended `self`.
    pub fn contains(&self, other: &Interval) -> bool {
        self.begin <= other.begin && self.end >= other.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            UpperBound::Bounded(end) => write!(f, "[{}, {})", self.begin, end),
            UpperBound::Unbounded => write!(f, "[{}, open)", self.begin),
        }
    }
}

/// A persisted record that occupies a time interval.
pub trait Scheduled {
    fn id(&self) -> Uuid;
    fn interval(&self) -> Interval;
}

/// Return the first record whose interval overlaps `candidate`,
/// ignoring the record with id `exclude`.
pub fn first_overlap<'a, T, I>(
    candidate: &Interval,
    records: I,
    exclude: Option<Uuid>,
) -> Option<&'a T>
where
    T: Scheduled + 'a,
    I: IntoIterator<Item = &'a T>,
{
    records
        .into_iter()
        .filter(|record| Some(record.id()) != exclude)
        .find(|record| record.interval().overlaps(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn closed(b: DateTime<Utc>, e: DateTime<Utc>) -> Interval {
        Interval::new(b, Some(e)).unwrap()
    }

    fn open(b: DateTime<Utc>) -> Interval {
        Interval::new(b, None).unwrap()
    }

    struct Slot {
        id: Uuid,
        interval: Interval,
    }

    impl Scheduled for Slot {
        fn id(&self) -> Uuid {
            self.id
        }

        fn interval(&self) -> Interval {
            self.interval
        }
    }

    #[test]
    fn end_must_follow_begin() {
        assert!(Interval::new(at(2022, 1, 2), Some(at(2022, 1, 1))).is_err());
        assert_eq!(
            Interval::new(at(2022, 1, 1), Some(at(2022, 1, 1))),
            Err(InvertedInterval {
                begin: at(2022, 1, 1),
                end: at(2022, 1, 1),
            })
        );
        assert!(Interval::new(at(2022, 1, 1), Some(at(2022, 1, 2))).is_ok());
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let a = closed(at(2022, 4, 5), at(2022, 5, 5));
        let b = closed(at(2022, 5, 5), at(2022, 6, 5));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));

        let c = open(at(2022, 5, 5));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn nested_and_partial_intervals_overlap() {
        let outer = closed(at(2022, 1, 1), at(2023, 1, 1));
        let inner = closed(at(2022, 3, 1), at(2022, 4, 1));
        let partial = closed(at(2022, 12, 1), at(2023, 2, 1));
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
        assert!(outer.overlaps(&partial));
    }

    #[test]
    fn open_ended_intervals_overlap_everything_after_begin() {
        let running = open(at(2022, 4, 5));
        assert!(running.overlaps(&closed(at(2030, 1, 1), at(2031, 1, 1))));
        assert!(running.overlaps(&open(at(2000, 1, 1))));
        assert!(!running.overlaps(&closed(at(2022, 1, 1), at(2022, 4, 5))));
    }

    #[test]
    fn containment_respects_open_ends() {
        let mount = closed(at(2022, 1, 1), at(2023, 1, 1));
        assert!(mount.contains(&closed(at(2022, 9, 5), at(2022, 9, 6))));
        assert!(mount.contains(&closed(at(2022, 1, 1), at(2023, 1, 1))));
        assert!(!mount.contains(&closed(at(2021, 12, 31), at(2022, 9, 6))));
        assert!(!mount.contains(&open(at(2022, 9, 5))));

        let running = open(at(2022, 1, 1));
        assert!(running.contains(&open(at(2022, 9, 5))));
        assert!(running.contains(&closed(at(2022, 9, 5), at(2040, 1, 1))));
    }

    #[test]
    fn first_overlap_skips_excluded_record() {
        let own = Slot {
            id: Uuid::new_v4(),
            interval: closed(at(2022, 1, 1), at(2022, 2, 1)),
        };
        let other = Slot {
            id: Uuid::new_v4(),
            interval: closed(at(2022, 2, 1), at(2022, 3, 1)),
        };
        let records = [own, other];

        let candidate = closed(at(2022, 1, 15), at(2022, 1, 20));
        assert!(first_overlap(&candidate, &records, Some(records[0].id)).is_none());

        let hit = first_overlap(&candidate, &records, None).unwrap();
        assert_eq!(hit.id, records[0].id);

        let spanning = closed(at(2022, 1, 15), at(2022, 2, 15));
        let hit = first_overlap(&spanning, &records, Some(records[0].id)).unwrap();
        assert_eq!(hit.id, records[1].id);
    }

    #[test]
    fn display_marks_open_end() {
        let running = open(at(2022, 4, 5));
        assert!(running.to_string().ends_with("open)"));
        assert_eq!(running.end().as_option(), None);

        let finished = closed(at(2022, 4, 5), at(2022, 5, 5));
        assert_eq!(finished.end().as_option(), Some(at(2022, 5, 5)));
    }
}
