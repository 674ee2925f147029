//! Bounded retry for work that may succeed on a later frame.

use std::fmt::Display;

use crate::error::StrokeError;

/// Result of one [`RetryBudget::attempt`].
#[derive(Debug, PartialEq)]
pub enum RetryOutcome<T, E> {
    Ready(T),
    /// Failed, but another attempt is allowed; schedule it on the next frame.
    Retry(E),
    /// Failed and the budget is spent.
    Exhausted(E),
}

/// Counts failed attempts against a fixed bound.
#[derive(Clone, Debug)]
pub struct RetryBudget {
    max_failures: u32,
    failures: u32,
    label: &'static str,
}

impl RetryBudget {
    pub fn new(label: &'static str, max_failures: u32) -> Self {
        Self {
            max_failures,
            failures: 0,
            label,
        }
    }

    #[inline]
    pub fn failures(&self) -> u32 {
        self.failures
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.failures >= self.max_failures
    }

    pub fn reset(&mut self) {
        self.failures = 0;
    }

    /// The error reported once the budget is spent.
    pub fn exhausted_error(&self, reason: impl Display) -> StrokeError {
        StrokeError::RetriesExhausted {
            attempts: self.failures,
            reason: reason.to_string(),
        }
    }

    /// Run `work` unless the budget is already spent.
    ///
    /// The failure that spends the budget is logged as a warning. Once spent,
    /// `work` is not run and `None` is returned until [`reset`](Self::reset).
    pub fn attempt<T, E, F>(&mut self, work: F) -> Option<RetryOutcome<T, E>>
    where
        E: Display,
        F: FnOnce() -> Result<T, E>,
    {
        if self.is_exhausted() {
            return None;
        }
        Some(match work() {
            Ok(value) => RetryOutcome::Ready(value),
            Err(err) => {
                self.failures = self.failures.saturating_add(1);
                if self.is_exhausted() {
                    log::warn!("{}: {}", self.label, self.exhausted_error(&err));
                    RetryOutcome::Exhausted(err)
                } else {
                    log::debug!("{}: attempt {} failed: {}", self.label, self.failures, err);
                    RetryOutcome::Retry(err)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn succeeds_without_spending_budget() {
        let mut budget = RetryBudget::new("measure", 3);
        let out: Option<RetryOutcome<u32, String>> = budget.attempt(|| Ok(7));
        assert_eq!(out, Some(RetryOutcome::Ready(7)));
        assert_eq!(budget.failures(), 0);
    }

    #[test]
    fn exhausts_on_the_bounding_failure() {
        let mut budget = RetryBudget::new("measure", 3);
        let fail = || Err::<(), _>("not laid out");
        assert_eq!(budget.attempt(fail), Some(RetryOutcome::Retry("not laid out")));
        assert_eq!(budget.attempt(fail), Some(RetryOutcome::Retry("not laid out")));
        assert_eq!(budget.attempt(fail), Some(RetryOutcome::Exhausted("not laid out")));
        assert!(budget.is_exhausted());
        budget.reset();
        assert!(!budget.is_exhausted());
    }

    #[test]
    fn recovers_before_the_bound() {
        let mut budget = RetryBudget::new("measure", 20);
        let mut frames = 0;
        let outcome = loop {
            frames += 1;
            let ready = frames >= 5;
            match budget.attempt(|| if ready { Ok(frames) } else { Err("hidden") }) {
                Some(RetryOutcome::Retry(_)) => continue,
                other => break other,
            }
        };
        assert_eq!(outcome, Some(RetryOutcome::Ready(5)));
        assert_eq!(budget.failures(), 4);
    }

    #[test]
    fn spent_budget_stops_running_work() {
        let mut budget = RetryBudget::new("measure", 1);
        let mut runs = 0;
        let mut fail = || {
            runs += 1;
            Err::<(), _>("hidden")
        };
        assert_eq!(budget.attempt(&mut fail), Some(RetryOutcome::Exhausted("hidden")));
        assert_eq!(budget.attempt(&mut fail), None);
        assert_eq!(runs, 1);
        assert_eq!(budget.failures(), 1);
        assert_eq!(
            budget.exhausted_error("hidden"),
            StrokeError::RetriesExhausted {
                attempts: 1,
                reason: "hidden".into()
            }
        );
    }
}
