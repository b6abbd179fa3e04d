//! Facet option vocabularies derived from the full catalog.

use std::collections::BTreeSet;

use serde::Serialize;

use miniforge_products::Product;

use crate::filter::Facet;

/// Distinct, sorted, non-empty values per facet.
///
/// Derived from the whole catalog rather than the filtered list so options do
/// not disappear as the shopper narrows a search. Re-derive whenever the
/// catalog changes; nothing caches it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetOptions {
    pub categories: Vec<String>,
    pub sizes: Vec<String>,
    pub designers: Vec<String>,
    pub creature_types: Vec<String>,
    pub weapons: Vec<String>,
}

impl FacetOptions {
    pub fn derive(products: &[Product]) -> Self {
        let collect = |facet: Facet| -> Vec<String> {
            products
                .iter()
                .flat_map(|p| facet.values(p))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        };

        Self {
            categories: collect(Facet::Category),
            sizes: collect(Facet::Size),
            designers: collect(Facet::Designer),
            creature_types: collect(Facet::CreatureType),
            weapons: collect(Facet::Weapon),
        }
    }

    pub fn options(&self, facet: Facet) -> &[String] {
        match facet {
            Facet::Category => &self.categories,
            Facet::Size => &self.sizes,
            Facet::Designer => &self.designers,
            Facet::CreatureType => &self.creature_types,
            Facet::Weapon => &self.weapons,
        }
    }
}
