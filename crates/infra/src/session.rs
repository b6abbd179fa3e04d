//! Catalog session: wires the product store, the view controller and the
//! grouping mutator together.
//!
//! Successful mutations are folded back into the controller (snapshot
//! replacement or local patch). Failed ones leave the controller exactly as it
//! was, so a half-applied set is never displayed.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use miniforge_catalog::{CatalogView, CatalogViewController};
use miniforge_core::ProductId;

use crate::config::CatalogConfig;
use crate::grouping::{Consistency, GroupingMutator, MutationReport, MutationResult};
use crate::repository::{CatalogRefresher, ProductRepository, RepositoryError};

pub struct CatalogSession<R> {
    repository: Arc<R>,
    controller: CatalogViewController,
    mutator: GroupingMutator<Arc<R>>,
    loaded_at: Option<DateTime<Utc>>,
}

impl<R: ProductRepository + 'static> CatalogSession<R> {
    /// Session that patches locally after mutations.
    pub fn new(repository: Arc<R>, config: &CatalogConfig) -> Self {
        Self {
            controller: CatalogViewController::new(config.page_size),
            mutator: GroupingMutator::new(repository.clone()),
            repository,
            loaded_at: None,
        }
    }

    /// Session that re-reads the catalog after mutations when the config allows it.
    pub fn with_refresher(
        repository: Arc<R>,
        refresher: Arc<dyn CatalogRefresher>,
        config: &CatalogConfig,
    ) -> Self {
        let mut session = Self::new(repository, config);
        if config.refresh_after_mutation {
            session.mutator = GroupingMutator::new(session.repository.clone()).with_refresher(refresher);
        } else {
            tracing::debug!("refresh after mutation disabled; using local patches");
        }
        session
    }

    pub fn controller(&self) -> &CatalogViewController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut CatalogViewController {
        &mut self.controller
    }

    pub fn mutator(&self) -> &GroupingMutator<Arc<R>> {
        &self.mutator
    }

    /// When the current snapshot was read from the store.
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    pub fn view(&self) -> CatalogView {
        self.controller.view()
    }

    /// Read the full catalog into the controller.
    pub async fn load(&mut self) -> Result<usize, RepositoryError> {
        let products = self.repository.list_products().await?;
        let count = products.len();
        self.controller.replace_catalog(products);
        self.loaded_at = Some(Utc::now());
        tracing::info!(products = count, "catalog loaded");
        Ok(count)
    }

    /// Drop `dragged` onto `target`.
    pub async fn join(&mut self, dragged: &ProductId, target: &ProductId) -> MutationResult {
        let result = self
            .mutator
            .join(dragged, target, self.controller.catalog())
            .await;
        if let Ok(report) = &result {
            self.apply_report(report);
        }
        result
    }

    /// Drag `product` out of its set.
    pub async fn leave(&mut self, product: &ProductId) -> MutationResult {
        let result = self.mutator.leave(product, self.controller.catalog()).await;
        if let Ok(report) = &result {
            self.apply_report(report);
        }
        result
    }

    fn apply_report(&mut self, report: &MutationReport) {
        match &report.consistency {
            Consistency::Unchanged => {}
            Consistency::Refreshed(products) => {
                self.controller.replace_catalog(products.clone());
                self.loaded_at = Some(Utc::now());
            }
            Consistency::Patched => {
                let patched = self
                    .controller
                    .patch_set_names(&report.affected, report.set_name.as_ref());
                tracing::debug!(patched, "patched local snapshot without re-reading the store");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::{MutationError, MutationOutcomeKind};
    use crate::repository::InMemoryProductRepository;
    use miniforge_products::{Product, SetName};

    fn store() -> Arc<InMemoryProductRepository> {
        Arc::new(InMemoryProductRepository::with_products(vec![
            Product::new("1", "Forge Lord Header", 2500),
            Product::new("2", "Forge Hammer", 400),
            Product::new("3", "Cave Troll", 4500),
        ]))
    }

    fn set_in_view(session: &CatalogSession<InMemoryProductRepository>, id: &str) -> Option<SetName> {
        session
            .controller()
            .find(&ProductId::new(id))
            .and_then(|p| p.set_name.clone())
    }

    #[tokio::test]
    async fn load_fills_the_controller() {
        let mut session = CatalogSession::new(store(), &CatalogConfig::default());
        assert!(session.loaded_at().is_none());
        assert_eq!(session.load().await.unwrap(), 3);
        assert_eq!(session.view().total_entries, 3);
        assert!(session.loaded_at().is_some());
    }

    #[tokio::test]
    async fn join_with_refresh_rereads_the_store() {
        let repo = store();
        let mut session =
            CatalogSession::with_refresher(repo.clone(), repo.clone(), &CatalogConfig::default());
        session.load().await.unwrap();

        session
            .join(&ProductId::new("2"), &ProductId::new("1"))
            .await
            .unwrap();

        assert_eq!(repo.refresh_count(), 1);
        assert_eq!(set_in_view(&session, "2"), SetName::parse("Forge Lord"));
        let view = session.view();
        assert_eq!(view.total_entries, 2);
        let composite = view.items.iter().find(|e| e.is_composite()).unwrap();
        assert_eq!(composite.id().as_str(), "1");
    }

    #[tokio::test]
    async fn join_without_refresh_patches_locally() {
        let repo = store();
        let config = CatalogConfig {
            refresh_after_mutation: false,
            ..CatalogConfig::default()
        };
        let mut session = CatalogSession::with_refresher(repo.clone(), repo.clone(), &config);
        session.load().await.unwrap();

        let report = session
            .join(&ProductId::new("2"), &ProductId::new("1"))
            .await
            .unwrap();

        assert_eq!(report.consistency, Consistency::Patched);
        assert_eq!(repo.refresh_count(), 0);
        assert_eq!(set_in_view(&session, "1"), SetName::parse("Forge Lord"));
        assert_eq!(set_in_view(&session, "2"), SetName::parse("Forge Lord"));
    }

    #[tokio::test]
    async fn failed_join_leaves_the_view_untouched() {
        let repo = store();
        repo.deny_writes("1");
        let mut session = CatalogSession::new(repo.clone(), &CatalogConfig::default());
        session.load().await.unwrap();
        let before = session.view();

        let err = session
            .join(&ProductId::new("2"), &ProductId::new("1"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), MutationOutcomeKind::PermissionDenied);
        assert_eq!(session.view(), before);
        assert!(!session.mutator().is_busy());
    }

    #[tokio::test]
    async fn one_sided_denial_hides_the_half_written_set() {
        let repo = store();
        repo.deny_writes("2");
        let mut session = CatalogSession::new(repo.clone(), &CatalogConfig::default());
        session.load().await.unwrap();
        let before = session.view();

        let err = session
            .join(&ProductId::new("2"), &ProductId::new("1"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            MutationError::PermissionDenied {
                product_ids: vec![ProductId::new("2")]
            }
        );
        // The target row was written; the view still must not show a set.
        assert_eq!(
            repo.record(&ProductId::new("1")).and_then(|r| r.set_name).as_deref(),
            Some("Forge Lord")
        );
        assert_eq!(set_in_view(&session, "1"), None);
        assert_eq!(session.view(), before);
    }

    #[tokio::test]
    async fn failed_leave_leaves_the_view_untouched() {
        let repo = Arc::new(InMemoryProductRepository::with_products(vec![
            Product::new("1", "Forge Lord Header", 2500).with_set("Forge Lord"),
            Product::new("2", "Forge Hammer", 400).with_set("Forge Lord"),
        ]));
        repo.fail_writes("2", "connection reset");
        let mut session = CatalogSession::new(repo.clone(), &CatalogConfig::default());
        session.load().await.unwrap();
        let before = session.view();
        assert_eq!(before.total_entries, 1);

        let err = session.leave(&ProductId::new("2")).await.unwrap_err();

        assert_eq!(err, MutationError::Backend("connection reset".to_string()));
        assert_eq!(session.view(), before);
        assert_eq!(set_in_view(&session, "2"), SetName::parse("Forge Lord"));
        assert!(!session.mutator().is_busy());
    }

    #[tokio::test]
    async fn leave_splits_a_set_back_apart() {
        let repo = store();
        let mut session = CatalogSession::new(repo.clone(), &CatalogConfig::default());
        session.load().await.unwrap();
        session
            .join(&ProductId::new("2"), &ProductId::new("1"))
            .await
            .unwrap();
        assert_eq!(session.view().total_entries, 2);

        session.leave(&ProductId::new("2")).await.unwrap();
        assert_eq!(set_in_view(&session, "2"), None);
        assert_eq!(session.view().total_entries, 3);
    }

    #[tokio::test]
    async fn stale_ids_are_not_found() {
        let mut session = CatalogSession::new(store(), &CatalogConfig::default());
        session.load().await.unwrap();
        let err = session.leave(&ProductId::new("77")).await.unwrap_err();
        assert_eq!(err, MutationError::NotFound(ProductId::new("77")));
    }
}
