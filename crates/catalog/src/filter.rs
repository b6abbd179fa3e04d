//! Facet filter: OR within a facet, AND across facets, AND with text search.

use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use miniforge_products::Product;

/// An independently filterable product attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Facet {
    Category,
    Size,
    Designer,
    CreatureType,
    Weapon,
}

impl Facet {
    pub const ALL: [Facet; 5] = [
        Facet::Category,
        Facet::Size,
        Facet::Designer,
        Facet::CreatureType,
        Facet::Weapon,
    ];

    /// Cross-cutting facets. An active selection on any of them turns set
    /// grouping off (see [`crate::resolver::grouping_bypassed`]).
    pub fn is_secondary(self) -> bool {
        matches!(self, Facet::Size | Facet::CreatureType | Facet::Weapon)
    }

    /// Single value of a single-valued facet. `Weapon` is multi-valued and
    /// always yields `None` here; use [`Product::weapon_tokens`].
    fn single_value(self, product: &Product) -> Option<&str> {
        match self {
            Facet::Category => product.category.as_deref(),
            Facet::Size => product.size.as_deref(),
            Facet::Designer => product.designer.as_deref(),
            Facet::CreatureType => product.creature_type.as_deref(),
            Facet::Weapon => None,
        }
    }

    /// Every value `product` carries for this facet.
    pub fn values(self, product: &Product) -> Vec<&str> {
        match self {
            Facet::Weapon => product.weapon_tokens().collect(),
            _ => self.single_value(product).into_iter().collect(),
        }
    }
}

/// Active search text plus one selection set per facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub search: String,
    pub categories: BTreeSet<String>,
    pub sizes: BTreeSet<String>,
    pub designers: BTreeSet<String>,
    pub creature_types: BTreeSet<String>,
    pub weapons: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with(mut self, facet: Facet, value: impl Into<String>) -> Self {
        self.selection_mut(facet).insert(value.into());
        self
    }

    /// Search text with surrounding whitespace removed.
    pub fn search_text(&self) -> &str {
        self.search.trim()
    }

    pub fn selection(&self, facet: Facet) -> &BTreeSet<String> {
        match facet {
            Facet::Category => &self.categories,
            Facet::Size => &self.sizes,
            Facet::Designer => &self.designers,
            Facet::CreatureType => &self.creature_types,
            Facet::Weapon => &self.weapons,
        }
    }

    pub fn selection_mut(&mut self, facet: Facet) -> &mut BTreeSet<String> {
        match facet {
            Facet::Category => &mut self.categories,
            Facet::Size => &mut self.sizes,
            Facet::Designer => &mut self.designers,
            Facet::CreatureType => &mut self.creature_types,
            Facet::Weapon => &mut self.weapons,
        }
    }

    /// No selection on any facet and no search text.
    pub fn is_empty(&self) -> bool {
        self.search_text().is_empty()
            && Facet::ALL.iter().all(|f| self.selection(*f).is_empty())
    }

    pub fn has_secondary_selection(&self) -> bool {
        Facet::ALL
            .iter()
            .any(|f| f.is_secondary() && !self.selection(*f).is_empty())
    }

    /// A product with no value for a facet fails an active selection on it.
    ///
    /// Open product question: letting such products through instead is an
    /// equally plausible reading. Revisit together with the `newest` fallback
    /// in [`crate::sort::sort`].
    fn facet_matches(&self, facet: Facet, product: &Product) -> bool {
        let selected = self.selection(facet);
        if selected.is_empty() {
            return true;
        }
        match facet {
            Facet::Weapon => product.weapon_tokens().any(|token| selected.contains(token)),
            _ => facet
                .single_value(product)
                .is_some_and(|value| selected.contains(value)),
        }
    }

    fn text_matches(needle: &str, product: &Product) -> bool {
        [
            Some(product.name.as_str()),
            product.category.as_deref(),
            product.designer.as_deref(),
            product.creature_type.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|haystack| haystack.to_lowercase().contains(needle))
    }

    /// Whether a single product passes every facet constraint and the text search.
    pub fn matches(&self, product: &Product) -> bool {
        if !Facet::ALL.iter().all(|f| self.facet_matches(*f, product)) {
            return false;
        }
        let text = self.search_text();
        text.is_empty() || Self::text_matches(&text.to_lowercase(), product)
    }
}

/// Apply `criteria` to `products`.
///
/// Empty criteria return the input borrowed as-is; otherwise the matching
/// products are cloned in input order.
pub fn filter<'a>(products: &'a [Product], criteria: &FilterCriteria) -> Cow<'a, [Product]> {
    if criteria.is_empty() {
        return Cow::Borrowed(products);
    }
    Cow::Owned(
        products
            .iter()
            .filter(|p| criteria.matches(p))
            .cloned()
            .collect(),
    )
}
