use serde::{Deserialize, Serialize};

use miniforge_core::{DomainError, DomainResult, Entity, ProductId, ValueObject};

/// Value the store keeps in `setName` when a product belongs to no set.
///
/// Only [`SetName::parse`] and [`SetName::to_persisted`] compare against it; the
/// rest of the workspace sees `Option<SetName>`.
pub const NO_SET_SENTINEL: &str = "Sin set";

/// Literal token embedded in a product name to mark the piece that represents
/// its set. Matched case-insensitively and never shown to shoppers.
pub const MARKER_TOKEN: &str = "header";

/// Returns `true` if `name` contains the marker token (ASCII case-insensitive).
pub fn contains_marker(name: &str) -> bool {
    name.to_ascii_lowercase().contains(MARKER_TOKEN)
}

/// Remove every occurrence of the marker token and collapse whitespace.
///
/// `"Forge Lord Header"` becomes `"Forge Lord"`. Each occurrence is replaced
/// by a space before whitespace is collapsed, so removal never splices two
/// fragments into a new token.
pub fn strip_marker(name: &str) -> String {
    let mut current = name.to_string();
    loop {
        // ASCII lowercasing keeps byte offsets aligned with `current`.
        let lowered = current.to_ascii_lowercase();
        let Some(start) = lowered.find(MARKER_TOKEN) else {
            break;
        };
        current.replace_range(start..start + MARKER_TOKEN.len(), " ");
    }
    current.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Name of the set a product belongs to.
///
/// Membership is compared case-insensitively; the original spelling is kept
/// for display and for writes. Deserialization goes through [`SetName::parse`],
/// so the sentinel and blank strings are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SetName(String);

impl SetName {
    /// Normalize a raw `setName` column value.
    ///
    /// Blank values and the sentinel (any casing) mean "no set".
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NO_SET_SENTINEL) {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// Derive the set name a standalone product would give its new set.
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::parse(&strip_marker(name))
    }

    /// Name for a new set founded by the product `name` / `id`.
    ///
    /// Prefers the display name; a name that is nothing but the marker token
    /// keeps its raw spelling, and a blank name falls back to the id.
    pub fn founded_by(name: &str, id: &ProductId) -> Self {
        Self::from_display_name(name)
            .or_else(|| Self::parse(name))
            .unwrap_or_else(|| Self(format!("Set {id}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive bucketing key.
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    /// Column value to persist for an optional set name.
    pub fn to_persisted(set_name: Option<&SetName>) -> String {
        match set_name {
            Some(name) => name.0.clone(),
            None => NO_SET_SENTINEL.to_string(),
        }
    }
}

impl PartialEq for SetName {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for SetName {}

impl core::hash::Hash for SetName {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl core::fmt::Display for SetName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SetName {
    type Error = DomainError;

    fn try_from(raw: String) -> DomainResult<Self> {
        Self::parse(&raw)
            .ok_or_else(|| DomainError::validation(format!("{raw:?} is not a set name")))
    }
}

impl From<SetName> for String {
    fn from(name: SetName) -> Self {
        name.0
    }
}

impl ValueObject for SetName {}

/// Product row exactly as the external store returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub designer: Option<String>,
    #[serde(default)]
    pub creature_type: Option<String>,
    #[serde(default)]
    pub weapon: Option<String>,
    /// Price in smallest currency unit (e.g. cents).
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub set_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Normalized catalog product.
///
/// Built from a [`ProductRecord`] at the repository-read boundary: blank
/// optional attributes become `None`, and the no-set sentinel becomes
/// `set_name: None`. Deserializing a `Product` reads a [`ProductRecord`] and
/// runs the same normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ProductRecord")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: Option<String>,
    pub size: Option<String>,
    pub designer: Option<String>,
    pub creature_type: Option<String>,
    pub weapon: Option<String>,
    /// Price in smallest currency unit (e.g. cents).
    pub price: u64,
    pub set_name: Option<SetName>,
    pub image: Option<String>,
    pub description: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

impl Product {
    /// Bare product with no facet attributes and no set.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: None,
            size: None,
            designer: None,
            creature_type: None,
            weapon: None,
            price,
            set_name: None,
            image: None,
            description: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_designer(mut self, designer: impl Into<String>) -> Self {
        self.designer = Some(designer.into());
        self
    }

    pub fn with_creature_type(mut self, creature_type: impl Into<String>) -> Self {
        self.creature_type = Some(creature_type.into());
        self
    }

    pub fn with_weapon(mut self, weapon: impl Into<String>) -> Self {
        self.weapon = Some(weapon.into());
        self
    }

    /// Attach a set; the sentinel and blank names leave the product standalone.
    pub fn with_set(mut self, set_name: &str) -> Self {
        self.set_name = SetName::parse(set_name);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the name carries the marker token.
    pub fn has_marker(&self) -> bool {
        contains_marker(&self.name)
    }

    /// Name as shown to shoppers (marker token stripped).
    pub fn display_name(&self) -> String {
        strip_marker(&self.name)
    }

    /// Individual weapon values: the `weapon` field split on `/`, each token trimmed.
    pub fn weapon_tokens(&self) -> impl Iterator<Item = &str> {
        self.weapon
            .as_deref()
            .unwrap_or_default()
            .split('/')
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    pub fn is_standalone(&self) -> bool {
        self.set_name.is_none()
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TryFrom<ProductRecord> for Product {
    type Error = DomainError;

    fn try_from(record: ProductRecord) -> DomainResult<Self> {
        let id: ProductId = record.id.parse()?;
        Ok(Self {
            id,
            name: record.name,
            category: non_blank(record.category),
            size: non_blank(record.size),
            designer: non_blank(record.designer),
            creature_type: non_blank(record.creature_type),
            weapon: non_blank(record.weapon),
            price: record.price,
            set_name: record.set_name.as_deref().and_then(SetName::parse),
            image: non_blank(record.image),
            description: non_blank(record.description),
        })
    }
}

impl From<Product> for ProductRecord {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name,
            category: product.category,
            size: product.size,
            designer: product.designer,
            creature_type: product.creature_type,
            weapon: product.weapon,
            price: product.price,
            set_name: Some(SetName::to_persisted(product.set_name.as_ref())),
            image: product.image,
            description: product.description,
        }
    }
}
