//! Catalog view materialization.
//!
//! Turns a flat product snapshot into the page a shopper sees:
//!
//! ```text
//! catalog ─▶ filter ─▶ resolve (set grouping) ─▶ sort ─▶ paginate ─▶ visible page
//! ```
//!
//! Every stage here is pure and synchronous. [`CatalogViewController`] owns the
//! filter/sort/page/mode state and re-runs the pipeline on demand; writes to
//! set membership live in the infrastructure layer.

pub mod facets;
pub mod filter;
pub mod mode;
pub mod resolver;
pub mod sort;
pub mod view;

pub use facets::FacetOptions;
pub use filter::{Facet, FilterCriteria, filter};
pub use mode::GroupingMode;
pub use resolver::{SubItem, ViewEntry, grouping_bypassed, resolve};
pub use sort::{DEFAULT_PAGE_SIZE, Page, SortKey, paginate, sort};
pub use view::{CatalogView, CatalogViewController};
