//! Product repository port.
//!
//! The catalog never owns product rows. It reads them through
//! [`ProductRepository::list_products`] and writes exactly one column,
//! `setName`, through [`ProductRepository::update_set_name`].

pub mod in_memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use miniforge_core::{DomainError, ProductId};
use miniforge_products::{Product, SetName};

pub use in_memory::InMemoryProductRepository;

/// Failure the store reports explicitly.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// The store rejected or failed the request and said so.
    #[error("backend error: {0}")]
    Backend(String),

    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A row could not be turned into a domain product.
    #[error("invalid product record: {0}")]
    InvalidRecord(#[from] DomainError),
}

impl RepositoryError {
    /// Underlying message without the category prefix.
    pub fn message(&self) -> String {
        match self {
            RepositoryError::Backend(msg) | RepositoryError::Unavailable(msg) => msg.clone(),
            RepositoryError::InvalidRecord(err) => err.to_string(),
        }
    }
}

/// Result of a single-row write.
///
/// `affected` and `error` are reported independently: a row-level security
/// layer may reject an update by matching zero rows *without* raising an
/// error, and that case must stay distinguishable from a hard failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Rows the store reported back as changed.
    pub affected: usize,
    pub error: Option<RepositoryError>,
}

impl WriteOutcome {
    pub fn applied(affected: usize) -> Self {
        Self {
            affected,
            error: None,
        }
    }

    pub fn failed(error: RepositoryError) -> Self {
        Self {
            affected: 0,
            error: Some(error),
        }
    }

    /// Zero rows and no error: the signature of a silent authorization rejection.
    pub fn is_silent_denial(&self) -> bool {
        self.error.is_none() && self.affected == 0
    }
}

/// Read/write port onto the external product store.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Read the full current catalog. Ordering is not significant.
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Set one product's `setName` (`None` persists the no-set sentinel) and
    /// report the affected rows back for verification.
    async fn update_set_name(&self, id: &ProductId, set_name: Option<&SetName>) -> WriteOutcome;
}

/// Optional collaborator that forces a fresh read from the source of truth.
#[async_trait]
pub trait CatalogRefresher: Send + Sync {
    async fn refresh_products(&self) -> Result<Vec<Product>, RepositoryError>;
}

#[async_trait]
impl<R> ProductRepository for Arc<R>
where
    R: ProductRepository + ?Sized,
{
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        (**self).list_products().await
    }

    async fn update_set_name(&self, id: &ProductId, set_name: Option<&SetName>) -> WriteOutcome {
        (**self).update_set_name(id, set_name).await
    }
}

#[async_trait]
impl<R> CatalogRefresher for Arc<R>
where
    R: CatalogRefresher + ?Sized,
{
    async fn refresh_products(&self) -> Result<Vec<Product>, RepositoryError> {
        (**self).refresh_products().await
    }
}
