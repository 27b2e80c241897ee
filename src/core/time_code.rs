//! Time codes for authored samples.
//!
//! A USD attribute holds an optional *default* value plus any number of
//! time samples. [`TimeCode`] addresses either slot.

use std::cmp::Ordering;
use std::fmt;

/// A time at which a value is read or authored.
#[derive(Clone, Copy)]
pub struct TimeCode(f64);

impl TimeCode {
    /// The default (unsampled) slot.
    pub const DEFAULT: Self = Self(f64::NAN);

    /// Time code at the given frame.
    #[inline]
    pub const fn new(t: f64) -> Self {
        Self(t)
    }

    /// True for the default slot.
    #[inline]
    pub fn is_default(self) -> bool {
        self.0.is_nan()
    }

    /// Frame value. NaN for the default slot.
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for TimeCode {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl PartialEq for TimeCode {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_default(), other.is_default()) {
            (true, true) => true,
            (false, false) => self.0 == other.0,
            _ => false,
        }
    }
}

impl PartialOrd for TimeCode {
    /// The default slot sorts before every numeric time.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.is_default(), other.is_default()) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (false, false) => self.0.partial_cmp(&other.0),
        }
    }
}

impl From<f64> for TimeCode {
    fn from(t: f64) -> Self {
        Self(t)
    }
}

impl From<i32> for TimeCode {
    fn from(t: i32) -> Self {
        Self(t as f64)
    }
}

impl fmt::Debug for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            write!(f, "DEFAULT")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_equality() {
        assert_eq!(TimeCode::DEFAULT, TimeCode::default());
        assert_ne!(TimeCode::DEFAULT, TimeCode::new(0.0));
        assert_eq!(TimeCode::new(2.0), TimeCode::from(2));
    }

    #[test]
    fn test_ordering() {
        assert!(TimeCode::DEFAULT < TimeCode::new(-1e9));
        assert!(TimeCode::new(1.0) < TimeCode::new(1.5));
        assert_eq!(format!("{}", TimeCode::DEFAULT), "DEFAULT");
    }
}
