//! Catalog view controller: owns filter/sort/page/mode state and composes the
//! pure stages into the visible page.

use serde::Serialize;

use miniforge_core::{Entity, ProductId};
use miniforge_products::{Product, SetName};

use crate::facets::FacetOptions;
use crate::filter::{Facet, FilterCriteria, filter};
use crate::mode::GroupingMode;
use crate::resolver::{ViewEntry, grouping_bypassed, resolve};
use crate::sort::{self, DEFAULT_PAGE_SIZE, SortKey, paginate};

/// The page handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogView {
    pub items: Vec<ViewEntry>,
    /// 1-based page index actually shown.
    pub page: usize,
    pub total_pages: usize,
    /// Number of resolved entries across all pages.
    pub total_entries: usize,
    pub grouping_bypassed: bool,
}

/// Stateful front of the materialization pipeline.
///
/// The controller never caches view entries: [`view`](Self::view) runs
/// filter → resolve → sort → paginate against the current snapshot every time.
#[derive(Debug, Clone)]
pub struct CatalogViewController {
    catalog: Vec<Product>,
    criteria: FilterCriteria,
    sort: SortKey,
    page: usize,
    page_size: usize,
    mode: GroupingMode,
}

impl Default for CatalogViewController {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl CatalogViewController {
    pub fn new(page_size: usize) -> Self {
        Self {
            catalog: Vec::new(),
            criteria: FilterCriteria::default(),
            sort: SortKey::default(),
            page: 1,
            page_size,
            mode: GroupingMode::default(),
        }
    }

    pub fn with_catalog(mut self, catalog: Vec<Product>) -> Self {
        self.replace_catalog(catalog);
        self
    }

    pub fn catalog(&self) -> &[Product] {
        &self.catalog
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn mode(&self) -> GroupingMode {
        self.mode
    }

    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.catalog.iter().find(|p| p.is(id))
    }

    /// Facet vocabularies for the current catalog.
    pub fn facet_options(&self) -> FacetOptions {
        FacetOptions::derive(&self.catalog)
    }

    /// Swap in a fresh snapshot (e.g. after an authoritative refresh).
    pub fn replace_catalog(&mut self, catalog: Vec<Product>) {
        self.catalog = catalog;
        self.clamp_page();
    }

    /// Overwrite `set_name` on the given records in the local snapshot.
    ///
    /// This is the degraded consistency path: the value is not re-read from the
    /// store. Returns how many records were patched.
    pub fn patch_set_names(&mut self, ids: &[ProductId], set_name: Option<&SetName>) -> usize {
        let mut patched = 0;
        for product in self.catalog.iter_mut().filter(|p| ids.contains(&p.id)) {
            product.set_name = set_name.cloned();
            patched += 1;
        }
        self.clamp_page();
        patched
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.criteria.search = search.into();
        self.page = 1;
    }

    /// Add `value` to a facet selection if absent, remove it if present.
    pub fn toggle(&mut self, facet: Facet, value: &str) {
        let selection = self.criteria.selection_mut(facet);
        if !selection.remove(value) {
            selection.insert(value.to_string());
        }
        self.page = 1;
    }

    pub fn select(&mut self, facet: Facet, value: impl Into<String>) {
        self.criteria.selection_mut(facet).insert(value.into());
        self.page = 1;
    }

    pub fn deselect(&mut self, facet: Facet, value: &str) {
        self.criteria.selection_mut(facet).remove(value);
        self.page = 1;
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.page = 1;
    }

    /// Jump to `page`, clamped to `1..=total_pages`.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages().max(1));
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page.saturating_add(1));
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    pub fn enter_grouping(&mut self) {
        self.set_mode(GroupingMode::Grouping);
    }

    pub fn enter_ungrouping(&mut self) {
        self.set_mode(GroupingMode::Ungrouping);
    }

    pub fn exit_mode(&mut self) {
        self.set_mode(GroupingMode::Idle);
    }

    pub fn toggle_grouping(&mut self) {
        self.set_mode(self.mode.toggle_grouping());
    }

    pub fn toggle_ungrouping(&mut self) {
        self.set_mode(self.mode.toggle_ungrouping());
    }

    fn set_mode(&mut self, mode: GroupingMode) {
        self.mode = mode;
        // Entering or leaving ungrouping changes how many entries exist.
        self.clamp_page();
    }

    /// Whether drag-to-join is reachable from the UI.
    pub fn can_join(&self) -> bool {
        self.mode.allows_join()
    }

    /// Whether drag-out-of-set is reachable from the UI.
    pub fn can_leave(&self) -> bool {
        self.mode.allows_leave()
    }

    /// Filter, resolve and sort the whole snapshot (no pagination).
    pub fn materialize(&self) -> Vec<ViewEntry> {
        let filtered = filter(&self.catalog, &self.criteria);
        let resolved = resolve(&filtered, &self.criteria, self.mode);
        tracing::debug!(
            catalog = self.catalog.len(),
            filtered = filtered.len(),
            resolved = resolved.len(),
            sort = self.sort.as_str(),
            "materialized catalog view"
        );
        sort::sort(resolved, self.sort)
    }

    pub fn total_pages(&self) -> usize {
        sort::total_pages(self.materialize().len(), self.page_size)
    }

    /// The current visible page.
    pub fn view(&self) -> CatalogView {
        let sorted = self.materialize();
        let total_entries = sorted.len();
        let page = paginate(sorted, self.page_size, self.page);
        CatalogView {
            items: page.items,
            page: self.page,
            total_pages: page.total_pages,
            total_entries,
            grouping_bypassed: grouping_bypassed(&self.criteria, self.mode),
        }
    }

    fn clamp_page(&mut self) {
        let total = self.total_pages().max(1);
        if self.page > total {
            self.page = total;
        }
        if self.page == 0 {
            self.page = 1;
        }
    }
}
