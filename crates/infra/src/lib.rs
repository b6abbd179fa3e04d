//! Infrastructure layer: product store ports, the grouping mutator, config and
//! the catalog session that ties them to the view controller.

pub mod config;
pub mod grouping;
pub mod repository;
pub mod session;

pub use config::CatalogConfig;
pub use grouping::{
    Consistency, GroupingMutator, MutationError, MutationOutcome, MutationOutcomeKind,
    MutationReport, MutationResult, MutatorState, WritePair,
};
pub use repository::{
    CatalogRefresher, InMemoryProductRepository, ProductRepository, RepositoryError, WriteOutcome,
};
pub use session::CatalogSession;
