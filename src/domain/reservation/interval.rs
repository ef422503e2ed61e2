//! Half-open time interval `[start, end)`.

use chrono::{DateTime, Utc};

use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Build a checked interval. `start` must be strictly before `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<Self> {
        if start >= end {
            return Err(DomainError::validation("Start time must be before end time"));
        }
        Ok(Self { start, end })
    }

    /// Half-open overlap test. Adjacent intervals (`a.end == b.start`) do not
    /// overlap, and an empty interval overlaps nothing.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn starts_after(&self, instant: DateTime<Utc>) -> bool {
        self.start > instant
    }
}
