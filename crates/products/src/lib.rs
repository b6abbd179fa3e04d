//! Products domain module.
//!
//! This crate contains the catalog record model for collectible miniatures:
//! the raw store row, the normalized domain record, and the set-membership
//! value object. Pure deterministic logic only (no IO, no storage).

pub mod product;

pub use product::{
    MARKER_TOKEN, NO_SET_SENTINEL, Product, ProductRecord, SetName, contains_marker, strip_marker,
};
