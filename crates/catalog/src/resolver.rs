//! Set resolver: collapses the members of each set into one composite entry.
//!
//! The entry shown for a set is always one of its real members (the *header*);
//! the remaining members ride along as [`SubItem`]s.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use miniforge_core::{ProductId, ValueObject};
use miniforge_products::{Product, SetName, strip_marker};

use crate::filter::FilterCriteria;
use crate::mode::GroupingMode;

/// Summary of a non-header set member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubItem {
    pub id: ProductId,
    pub name: String,
    pub image: Option<String>,
    pub description: Option<String>,
}

impl SubItem {
    pub fn display_name(&self) -> String {
        strip_marker(&self.name)
    }
}

impl From<&Product> for SubItem {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            image: product.image.clone(),
            description: product.description.clone(),
        }
    }
}

impl ValueObject for SubItem {}

/// One card in the materialized view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewEntry {
    pub product: Product,
    /// Other members of the product's set, in header-selection order.
    /// Empty for standalone products and for single-member sets.
    pub sub_items: Vec<SubItem>,
}

impl ViewEntry {
    pub fn standalone(product: Product) -> Self {
        Self {
            product,
            sub_items: Vec::new(),
        }
    }

    pub fn id(&self) -> &ProductId {
        &self.product.id
    }

    pub fn price(&self) -> u64 {
        self.product.price
    }

    pub fn set_name(&self) -> Option<&SetName> {
        self.product.set_name.as_ref()
    }

    pub fn is_composite(&self) -> bool {
        !self.sub_items.is_empty()
    }
}

/// Whether set grouping is switched off for this pass.
///
/// Grouping is skipped whenever a cross-cutting facet (size, creature type,
/// weapon) is selected, or while the operator is ungrouping. This is a hard
/// rule: a size filter must show every matching piece, not a header that
/// happens to share a set with it.
pub fn grouping_bypassed(criteria: &FilterCriteria, mode: GroupingMode) -> bool {
    mode == GroupingMode::Ungrouping || criteria.has_secondary_selection()
}

/// Header-selection order: marker-bearing names first, then ids ascending.
///
/// Ids compare as plain strings here, so `"10"` sorts before `"9"`.
fn header_order(a: &Product, b: &Product) -> Ordering {
    b.has_marker()
        .cmp(&a.has_marker())
        .then_with(|| a.id.as_str().cmp(b.id.as_str()))
}

/// Materialize view entries from filtered products.
///
/// Standalone products come first in input order, followed by one composite
/// entry per set ordered by the set's case-insensitive key. The sort stage
/// imposes the final order.
pub fn resolve(
    products: &[Product],
    criteria: &FilterCriteria,
    mode: GroupingMode,
) -> Vec<ViewEntry> {
    if grouping_bypassed(criteria, mode) {
        return products.iter().cloned().map(ViewEntry::standalone).collect();
    }

    let mut entries = Vec::with_capacity(products.len());
    let mut buckets: BTreeMap<String, Vec<&Product>> = BTreeMap::new();

    for product in products {
        match &product.set_name {
            None => entries.push(ViewEntry::standalone(product.clone())),
            Some(set_name) => buckets.entry(set_name.key()).or_default().push(product),
        }
    }

    for (_, mut members) in buckets {
        members.sort_by(|a, b| header_order(a, b));
        let mut members = members.into_iter();
        let Some(header) = members.next() else {
            continue;
        };
        entries.push(ViewEntry {
            product: header.clone(),
            sub_items: members.map(SubItem::from).collect(),
        });
    }

    entries
}
