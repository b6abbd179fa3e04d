use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use miniforge_core::ProductId;
use miniforge_products::{Product, ProductRecord, SetName};

use super::{CatalogRefresher, ProductRepository, RepositoryError, WriteOutcome};

/// Per-row write rule, standing in for a permissioned store's access policy.
#[derive(Debug, Clone, PartialEq, Eq)]
enum WriteRule {
    /// Match zero rows without reporting an error.
    Deny,
    /// Report an explicit backend error.
    Fail(String),
}

/// In-memory product store for tests/dev.
///
/// Rows are kept in their raw [`ProductRecord`] form, so the sentinel
/// normalization runs on every read exactly as it would against a real store.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    rows: RwLock<BTreeMap<String, ProductRecord>>,
    rules: RwLock<HashMap<ProductId, WriteRule>>,
    refreshes: AtomicUsize,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = ProductRecord>) -> Self {
        let repo = Self::new();
        for record in records {
            repo.insert(record);
        }
        repo
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        Self::with_records(products.into_iter().map(ProductRecord::from))
    }

    pub fn insert(&self, record: ProductRecord) {
        if let Ok(mut rows) = self.rows.write() {
            rows.insert(record.id.clone(), record);
        }
    }

    /// Raw row as currently stored.
    pub fn record(&self, id: &ProductId) -> Option<ProductRecord> {
        let rows = self.rows.read().ok()?;
        rows.get(id.as_str()).cloned()
    }

    /// Make writes to `id` silently match zero rows.
    pub fn deny_writes(&self, id: impl Into<ProductId>) {
        self.set_rule(id.into(), WriteRule::Deny);
    }

    /// Make writes to `id` fail with an explicit error.
    pub fn fail_writes(&self, id: impl Into<ProductId>, message: impl Into<String>) {
        self.set_rule(id.into(), WriteRule::Fail(message.into()));
    }

    pub fn clear_write_rules(&self) {
        if let Ok(mut rules) = self.rules.write() {
            rules.clear();
        }
    }

    /// Number of authoritative refreshes served.
    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    fn set_rule(&self, id: ProductId, rule: WriteRule) {
        if let Ok(mut rules) = self.rules.write() {
            rules.insert(id, rule);
        }
    }

    fn rule_for(&self, id: &ProductId) -> Option<WriteRule> {
        let rules = self.rules.read().ok()?;
        rules.get(id).cloned()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| RepositoryError::Unavailable("product rows lock poisoned".to_string()))?;

        rows.values()
            .cloned()
            .map(|record| Product::try_from(record).map_err(RepositoryError::from))
            .collect()
    }

    async fn update_set_name(&self, id: &ProductId, set_name: Option<&SetName>) -> WriteOutcome {
        match self.rule_for(id) {
            Some(WriteRule::Deny) => return WriteOutcome::applied(0),
            Some(WriteRule::Fail(message)) => {
                return WriteOutcome::failed(RepositoryError::Backend(message));
            }
            None => {}
        }

        let mut rows = match self.rows.write() {
            Ok(rows) => rows,
            Err(_) => {
                return WriteOutcome::failed(RepositoryError::Unavailable(
                    "product rows lock poisoned".to_string(),
                ));
            }
        };

        match rows.get_mut(id.as_str()) {
            Some(record) => {
                record.set_name = Some(SetName::to_persisted(set_name));
                WriteOutcome::applied(1)
            }
            None => WriteOutcome::applied(0),
        }
    }
}

#[async_trait]
impl CatalogRefresher for InMemoryProductRepository {
    async fn refresh_products(&self) -> Result<Vec<Product>, RepositoryError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        self.list_products().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miniforge_core::DomainError;
    use miniforge_products::NO_SET_SENTINEL;

    fn repo() -> InMemoryProductRepository {
        InMemoryProductRepository::with_products(vec![
            Product::new("1", "Forge Lord Header", 2500),
            Product::new("2", "Forge Guard", 900).with_set("Forge Lord"),
        ])
    }

    #[tokio::test]
    async fn reads_normalize_the_sentinel() {
        let repo = repo();
        assert_eq!(
            repo.record(&ProductId::new("1")).and_then(|r| r.set_name).as_deref(),
            Some(NO_SET_SENTINEL)
        );
        let products = repo.list_products().await.unwrap();
        assert!(products.iter().any(|p| p.id.as_str() == "1" && p.set_name.is_none()));
    }

    #[tokio::test]
    async fn update_reports_one_affected_row() {
        let repo = repo();
        let name = SetName::parse("Forge Lord");
        let outcome = repo.update_set_name(&ProductId::new("1"), name.as_ref()).await;
        assert_eq!(outcome, WriteOutcome::applied(1));
        assert_eq!(
            repo.record(&ProductId::new("1")).and_then(|r| r.set_name).as_deref(),
            Some("Forge Lord")
        );
    }

    #[tokio::test]
    async fn clearing_persists_the_sentinel() {
        let repo = repo();
        let outcome = repo.update_set_name(&ProductId::new("2"), None).await;
        assert_eq!(outcome.affected, 1);
        assert_eq!(
            repo.record(&ProductId::new("2")).and_then(|r| r.set_name).as_deref(),
            Some(NO_SET_SENTINEL)
        );
    }

    #[tokio::test]
    async fn denied_rows_match_nothing_silently() {
        let repo = repo();
        repo.deny_writes("1");
        let outcome = repo.update_set_name(&ProductId::new("1"), SetName::parse("X").as_ref()).await;
        assert!(outcome.is_silent_denial());
        assert!(repo.list_products().await.unwrap().iter().all(|p| p.id.as_str() != "1" || p.set_name.is_none()));
    }

    #[tokio::test]
    async fn failing_rows_report_an_error() {
        let repo = repo();
        repo.fail_writes("2", "statement timeout");
        let outcome = repo.update_set_name(&ProductId::new("2"), None).await;
        assert_eq!(
            outcome.error,
            Some(RepositoryError::Backend("statement timeout".to_string()))
        );
        assert!(!outcome.is_silent_denial());

        repo.clear_write_rules();
        assert_eq!(repo.update_set_name(&ProductId::new("2"), None).await.affected, 1);
    }

    #[tokio::test]
    async fn unknown_rows_match_nothing() {
        let outcome = repo().update_set_name(&ProductId::new("404"), None).await;
        assert!(outcome.is_silent_denial());
    }

    #[tokio::test]
    async fn invalid_rows_fail_the_read() {
        let repo = InMemoryProductRepository::with_records(vec![ProductRecord {
            id: "  ".to_string(),
            name: "Ghost".to_string(),
            category: None,
            size: None,
            designer: None,
            creature_type: None,
            weapon: None,
            price: 0,
            set_name: None,
            image: None,
            description: None,
        }]);
        let err = repo.list_products().await.unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidRecord(DomainError::InvalidId(_))));
    }

    #[tokio::test]
    async fn refresh_counts_and_rereads() {
        let repo = repo();
        let products = repo.refresh_products().await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(repo.refresh_count(), 1);
    }
}
