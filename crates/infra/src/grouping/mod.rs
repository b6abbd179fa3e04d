//! Set membership mutations (join / leave).
//!
//! An operator merges pieces into a set by dropping one card onto another, and
//! splits a piece back out by dragging it away. Both operations write only the
//! `setName` column and go through the external store, which may enforce
//! row-level permissions.
//!
//! ```text
//! join(dragged, target)
//!   ↓
//! 1. resolve both from the snapshot           → NotFound
//!   ↓
//! 2. pick set name (target's, or derived)
//!   ↓
//! 3. two writes, jointly awaited              → BackendError / PermissionDenied
//!   ↓
//! 4. refresh from the store, or patch locally
//! ```
//!
//! Exactly one operation may be in flight; a second caller gets
//! [`MutationError::Busy`] instead of interleaving with a half-applied join.

pub mod write_pair;

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use thiserror::Error;

use miniforge_core::{Entity, ProductId};
use miniforge_products::{Product, SetName};

use crate::repository::{CatalogRefresher, ProductRepository};

pub use write_pair::{SettledWrite, WritePair};

fn join_ids(ids: &[ProductId]) -> String {
    ids.iter().map(ProductId::as_str).collect::<Vec<_>>().join(", ")
}

/// Why a join or leave did not happen.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MutationError {
    /// A referenced id is not in the snapshot (stale UI state).
    #[error("product {0} is not in the current catalog")]
    NotFound(ProductId),

    /// The store accepted the update but changed no rows.
    #[error(
        "permission denied: the store changed no rows for {}; your account may not be allowed to edit these products",
        join_ids(.product_ids)
    )]
    PermissionDenied { product_ids: Vec<ProductId> },

    /// The store reported an explicit failure.
    #[error("backend error: {0}")]
    Backend(String),

    /// Another join or leave is still in flight.
    #[error("another set change is still in progress")]
    Busy,
}

impl MutationError {
    pub fn kind(&self) -> MutationOutcomeKind {
        match self {
            MutationError::NotFound(_) => MutationOutcomeKind::NotFound,
            MutationError::PermissionDenied { .. } => MutationOutcomeKind::PermissionDenied,
            MutationError::Backend(_) => MutationOutcomeKind::BackendError,
            MutationError::Busy => MutationOutcomeKind::Busy,
        }
    }
}

/// Discriminant handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MutationOutcomeKind {
    Ok,
    NotFound,
    PermissionDenied,
    BackendError,
    Busy,
}

/// How the caller's view should catch up with a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Consistency {
    /// Nothing was written.
    Unchanged,
    /// Fresh catalog read back from the store; replace the snapshot with it.
    Refreshed(Vec<Product>),
    /// No refresh happened; patch `set_name` on the affected records locally.
    /// The value was not re-read from storage.
    Patched,
}

/// What a successful mutation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationReport {
    pub affected: Vec<ProductId>,
    pub set_name: Option<SetName>,
    pub consistency: Consistency,
}

impl MutationReport {
    fn unchanged() -> Self {
        Self {
            affected: Vec::new(),
            set_name: None,
            consistency: Consistency::Unchanged,
        }
    }
}

pub type MutationResult = Result<MutationReport, MutationError>;

/// Serializable outcome (kind + human-readable message).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationOutcome {
    pub kind: MutationOutcomeKind,
    pub message: String,
}

impl From<&MutationResult> for MutationOutcome {
    fn from(result: &MutationResult) -> Self {
        match result {
            Ok(report) if report.consistency == Consistency::Unchanged => Self {
                kind: MutationOutcomeKind::Ok,
                message: "nothing to change".to_string(),
            },
            Ok(report) => Self {
                kind: MutationOutcomeKind::Ok,
                message: match &report.set_name {
                    Some(name) => format!("{} product(s) now in set \"{name}\"", report.affected.len()),
                    None => format!("{} product(s) removed from their set", report.affected.len()),
                },
            },
            Err(err) => Self {
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }
}

/// Operation currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MutatorState {
    #[default]
    Idle,
    Joining,
    Leaving,
}

/// Claim on the single in-flight slot; releases it on drop, on every path.
struct InFlight<'a> {
    state: &'a Mutex<MutatorState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = MutatorState::Idle;
    }
}

/// Executes join/leave against the product store.
pub struct GroupingMutator<R> {
    repository: R,
    refresher: Option<Arc<dyn CatalogRefresher>>,
    state: Mutex<MutatorState>,
}

impl<R> core::fmt::Debug for GroupingMutator<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GroupingMutator")
            .field("refresher", &self.refresher.is_some())
            .field("state", &self.state())
            .finish()
    }
}

impl<R> GroupingMutator<R> {
    /// Mutator without a refresher: successes report [`Consistency::Patched`].
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            refresher: None,
            state: Mutex::new(MutatorState::Idle),
        }
    }

    /// Re-read the catalog after every successful write.
    pub fn with_refresher(mut self, refresher: Arc<dyn CatalogRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    pub fn state(&self) -> MutatorState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_busy(&self) -> bool {
        self.state() != MutatorState::Idle
    }

    fn begin(&self, operation: MutatorState) -> Result<InFlight<'_>, MutationError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != MutatorState::Idle {
            return Err(MutationError::Busy);
        }
        *state = operation;
        Ok(InFlight { state: &self.state })
    }
}

fn find<'a>(snapshot: &'a [Product], id: &ProductId) -> Result<&'a Product, MutationError> {
    snapshot
        .iter()
        .find(|p| p.is(id))
        .ok_or_else(|| MutationError::NotFound(id.clone()))
}

impl<R: ProductRepository> GroupingMutator<R> {
    /// Merge `dragged` into `target`'s set.
    ///
    /// The target keeps its set name if it has one; otherwise a new set is
    /// named after the target's display name. Dropping a card onto itself is
    /// a successful no-op.
    pub async fn join(
        &self,
        dragged_id: &ProductId,
        target_id: &ProductId,
        snapshot: &[Product],
    ) -> MutationResult {
        if dragged_id == target_id {
            return Ok(MutationReport::unchanged());
        }

        let _flight = self.begin(MutatorState::Joining)?;

        let dragged = find(snapshot, dragged_id)?;
        let target = find(snapshot, target_id)?;

        let set_name = target
            .set_name
            .clone()
            .unwrap_or_else(|| SetName::founded_by(&target.name, &target.id));

        tracing::info!(
            dragged = %dragged.id,
            target = %target.id,
            set_name = %set_name,
            "joining products into set"
        );

        let pair = WritePair::settle(
            (
                dragged.id.clone(),
                self.repository.update_set_name(&dragged.id, Some(&set_name)),
            ),
            (
                target.id.clone(),
                self.repository.update_set_name(&target.id, Some(&set_name)),
            ),
        )
        .await;

        if let Err(err) = pair.verdict() {
            match &err {
                MutationError::PermissionDenied { product_ids } => tracing::warn!(
                    denied = %join_ids(product_ids),
                    "join silently rejected by store (zero rows, no error)"
                ),
                other => tracing::error!(error = %other, "join failed"),
            }
            return Err(err);
        }

        let consistency = self.catch_up().await;
        tracing::info!(set_name = %set_name, "join complete");

        Ok(MutationReport {
            affected: vec![dragged.id.clone(), target.id.clone()],
            set_name: Some(set_name),
            consistency,
        })
    }

    /// Remove `product_id` from whatever set it belongs to.
    pub async fn leave(&self, product_id: &ProductId, snapshot: &[Product]) -> MutationResult {
        let _flight = self.begin(MutatorState::Leaving)?;

        let product = find(snapshot, product_id)?;
        tracing::info!(product = %product.id, "removing product from its set");

        let outcome = self.repository.update_set_name(&product.id, None).await;
        if let Some(error) = outcome.error {
            tracing::error!(error = %error, "leave failed");
            return Err(MutationError::Backend(error.message()));
        }
        if outcome.affected == 0 {
            tracing::warn!(product = %product.id, "leave changed no rows");
        }

        let consistency = self.catch_up().await;
        tracing::info!(product = %product.id, "leave complete");

        Ok(MutationReport {
            affected: vec![product.id.clone()],
            set_name: None,
            consistency,
        })
    }

    /// Re-read from the store when possible; fall back to a local patch.
    async fn catch_up(&self) -> Consistency {
        let Some(refresher) = &self.refresher else {
            return Consistency::Patched;
        };
        match refresher.refresh_products().await {
            Ok(products) => Consistency::Refreshed(products),
            Err(err) => {
                tracing::warn!(error = %err, "refresh after mutation failed; patching locally");
                Consistency::Patched
            }
        }
    }
}
