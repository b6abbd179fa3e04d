//! Jointly-awaited write pair.
//!
//! A join issues two physically independent updates that must be judged as one
//! logical transaction. [`WritePair::settle`] drives both to completion before
//! anything looks at either result, and [`WritePair::verdict`] evaluates them
//! together.

use std::future::Future;

use miniforge_core::ProductId;

use crate::repository::{RepositoryError, WriteOutcome};

use super::MutationError;

/// A write that has finished, tagged with the row it targeted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledWrite {
    pub product_id: ProductId,
    pub outcome: WriteOutcome,
}

impl SettledWrite {
    pub fn error(&self) -> Option<&RepositoryError> {
        self.outcome.error.as_ref()
    }

    pub fn is_silent_denial(&self) -> bool {
        self.outcome.is_silent_denial()
    }
}

/// Two settled writes judged together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritePair {
    pub first: SettledWrite,
    pub second: SettledWrite,
}

impl WritePair {
    /// Run both writes concurrently and wait for *both* to settle.
    pub async fn settle<A, B>(first: (ProductId, A), second: (ProductId, B)) -> Self
    where
        A: Future<Output = WriteOutcome>,
        B: Future<Output = WriteOutcome>,
    {
        let (first_id, first_write) = first;
        let (second_id, second_write) = second;
        let (first_outcome, second_outcome) = tokio::join!(first_write, second_write);

        Self {
            first: SettledWrite {
                product_id: first_id,
                outcome: first_outcome,
            },
            second: SettledWrite {
                product_id: second_id,
                outcome: second_outcome,
            },
        }
    }

    pub fn writes(&self) -> [&SettledWrite; 2] {
        [&self.first, &self.second]
    }

    /// Combined result of both writes.
    ///
    /// An explicit error on either side wins (the first one's message is
    /// surfaced). Only when neither errored does a zero-row write count as a
    /// silent permission denial.
    pub fn verdict(&self) -> Result<(), MutationError> {
        if let Some(error) = self.writes().into_iter().find_map(SettledWrite::error) {
            return Err(MutationError::Backend(error.message()));
        }

        let denied: Vec<ProductId> = self
            .writes()
            .into_iter()
            .filter(|w| w.is_silent_denial())
            .map(|w| w.product_id.clone())
            .collect();
        if !denied.is_empty() {
            return Err(MutationError::PermissionDenied {
                product_ids: denied,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn pair(first: WriteOutcome, second: WriteOutcome) -> WritePair {
        WritePair {
            first: SettledWrite {
                product_id: ProductId::new("a"),
                outcome: first,
            },
            second: SettledWrite {
                product_id: ProductId::new("b"),
                outcome: second,
            },
        }
    }

    #[test]
    fn both_applied_is_ok() {
        assert!(pair(WriteOutcome::applied(1), WriteOutcome::applied(1)).verdict().is_ok());
    }

    #[test]
    fn double_zero_rows_is_permission_denied() {
        let err = pair(WriteOutcome::applied(0), WriteOutcome::applied(0))
            .verdict()
            .unwrap_err();
        assert_eq!(
            err,
            MutationError::PermissionDenied {
                product_ids: vec![ProductId::new("a"), ProductId::new("b")]
            }
        );
    }

    #[test]
    fn one_sided_zero_rows_is_still_denied() {
        let err = pair(WriteOutcome::applied(1), WriteOutcome::applied(0))
            .verdict()
            .unwrap_err();
        assert!(matches!(err, MutationError::PermissionDenied { ref product_ids } if product_ids == &[ProductId::new("b")]));
    }

    #[test]
    fn explicit_error_beats_silent_denial() {
        let err = pair(
            WriteOutcome::applied(0),
            WriteOutcome::failed(RepositoryError::Backend("deadlock detected".to_string())),
        )
        .verdict()
        .unwrap_err();
        assert_eq!(err, MutationError::Backend("deadlock detected".to_string()));
    }

    #[test]
    fn first_error_message_is_surfaced() {
        let err = pair(
            WriteOutcome::failed(RepositoryError::Backend("first".to_string())),
            WriteOutcome::failed(RepositoryError::Backend("second".to_string())),
        )
        .verdict()
        .unwrap_err();
        assert!(err.to_string().contains("first"));
    }

    #[tokio::test]
    async fn settle_waits_for_the_slower_write() {
        let slow_finished = Arc::new(AtomicBool::new(false));
        let flag = slow_finished.clone();

        let fast = async { WriteOutcome::applied(1) };
        let slow = async move {
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            flag.store(true, Ordering::SeqCst);
            WriteOutcome::applied(1)
        };

        let pair = WritePair::settle((ProductId::new("a"), fast), (ProductId::new("b"), slow)).await;
        assert!(slow_finished.load(Ordering::SeqCst));
        assert!(pair.verdict().is_ok());
    }
}
