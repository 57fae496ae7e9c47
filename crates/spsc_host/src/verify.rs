//! Sequence verification for stress runs.

use thiserror::Error;

/// Ways a stress run can show that the queue lost, duplicated or reordered
/// values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// A value arrived out of sequence.
    #[error("dequeued {got} where {expected} was expected")]
    OutOfOrder { expected: u64, got: u64 },

    /// The consumer saw no new value for longer than the stall timeout.
    #[error("consumer stalled after {received} of {expected} values")]
    Stalled { received: u64, expected: u64 },
}

/// Checks that dequeued values form the sequence 0, 1, 2, ...
///
/// Keeps consuming after a violation (resyncing on the value it saw) so the
/// producer is never left blocked on a full ring; only the first violation is
/// reported.
#[derive(Debug, Default)]
pub struct SequenceChecker {
    next: u64,
    received: u64,
    first_violation: Option<VerifyError>,
}

impl SequenceChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, value: u64) {
        if value != self.next && self.first_violation.is_none() {
            self.first_violation = Some(VerifyError::OutOfOrder {
                expected: self.next,
                got: value,
            });
        }
        self.next = value.wrapping_add(1);
        self.received += 1;
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn finish(self) -> Result<u64, VerifyError> {
        match self.first_violation {
            Some(err) => Err(err),
            None => Ok(self.received),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_sequence() {
        let mut checker = SequenceChecker::new();
        for v in 0..100 {
            checker.observe(v);
        }
        assert_eq!(checker.finish(), Ok(100));
    }

    #[test]
    fn reports_first_skip_only() {
        let mut checker = SequenceChecker::new();
        for v in [0, 1, 3, 4, 4, 5] {
            checker.observe(v);
        }
        assert_eq!(checker.received(), 6);
        assert_eq!(
            checker.finish(),
            Err(VerifyError::OutOfOrder {
                expected: 2,
                got: 3
            })
        );
    }

    #[test]
    fn duplicate_is_a_violation() {
        let mut checker = SequenceChecker::new();
        checker.observe(0);
        checker.observe(0);
        assert!(checker.finish().is_err());
    }
}
