use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque, monotonic point in time produced by a `Clock` (see
/// `apex_core::clock`). Ordering is total within the `Clock` instance that
/// produced it; comparing `Timestamp`s from different clocks is undefined —
/// nothing in the type system stops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Constructs a `Timestamp` from raw nanoseconds. Reserved for `Clock`
    /// implementations; application code should call `Clock::now()`.
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    pub const fn as_millis(self) -> i64 {
        self.0 / 1_000_000
    }

    pub const EPOCH: Timestamp = Timestamp(0);
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_total() {
        let a = Timestamp::from_nanos(1);
        let b = Timestamp::from_nanos(2);
        assert!(a < b);
    }

    #[test]
    fn millis_conversion_truncates() {
        let t = Timestamp::from_nanos(1_500_000);
        assert_eq!(t.as_millis(), 1);
    }
}
