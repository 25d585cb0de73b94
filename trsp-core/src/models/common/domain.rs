#[cfg(test)]
#[path = "../../../tests/unit/models/common/domain_test.rs"]
mod domain_test;

/// Specifies a node id: a dense index of depot or request in `[0, max_id)`.
pub type NodeId = usize;

/// Specifies cost value.
pub type Cost = f64;

/// Represents a time.
pub type Timestamp = f64;

/// Specifies a duration.
pub type Duration = f64;

/// A spare parts amount which is used to represent unlimited availability (e.g. at the main depot).
pub const UNLIMITED_SPARE_PARTS: i32 = i32::MAX;

/// Represents a time window.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeWindow {
    /// Earliest start of service.
    pub start: Timestamp,
    /// Latest start of service.
    pub end: Timestamp,
}

impl TimeWindow {
    /// Creates a new [`TimeWindow`].
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Returns unlimited time window.
    pub fn max() -> Self {
        Self { start: 0., end: f64::MAX }
    }

    /// Checks whether service can start when arriving at given time.
    pub fn is_feasible(&self, arrival: Timestamp) -> bool {
        arrival <= self.end
    }

    /// Returns the earliest time when service can start for given arrival.
    pub fn earliest_start_of_service(&self, arrival: Timestamp) -> Timestamp {
        arrival.max(self.start)
    }

    /// Returns waiting time for given arrival.
    pub fn waiting(&self, arrival: Timestamp) -> Duration {
        (self.start - arrival).max(0.)
    }

    /// Returns violation of the time window end for given arrival.
    pub fn lateness(&self, arrival: Timestamp) -> Duration {
        (arrival - self.end).max(0.)
    }
}

/// Represents a planar location.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Location {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Location {
    /// Creates a new [`Location`].
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns euclidean distance to other location.
    pub fn distance(&self, other: &Location) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}
