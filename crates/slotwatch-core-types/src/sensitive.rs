//! Sensitive data marker for automatic redaction
//!
//! The capture secret and store URLs (which may embed credentials) are held
//! in a `Sensitive<T>` so they never end up in `Debug` output or log events.

use std::fmt;

/// Wrapper for sensitive data that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use slotwatch_core_types::Sensitive;
///
/// let secret = Sensitive::new("cron-token".to_string());
/// assert_eq!(format!("{:?}", secret), "***REDACTED***");
/// assert!(secret.matches("cron-token"));
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying value. Only call this at the point of use.
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T: AsRef<str>> Sensitive<T> {
    /// Compare against a candidate without short-circuiting on the first
    /// differing byte.
    pub fn matches(&self, candidate: &str) -> bool {
        let expected = self.0.as_ref().as_bytes();
        let candidate = candidate.as_bytes();
        if expected.len() != candidate.len() {
            return false;
        }
        expected
            .iter()
            .zip(candidate)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
