//! Conversion of element query results into snapshot trees
//!
//! This module turns the flat `path -> attributes` map returned by the element
//! query into a tree of typed nodes. It includes:
//! - Path / PathIndex: structural paths and the parent/child index over them
//! - DefaultValueFinder: decides which attribute values are platform defaults
//! - IdProvider: stable identifiers independent of element position
//! - TreeBuilder: the flat-map-to-tree conversion
//! - FrameConverter: captures nested frame documents and splices them in
//! - ElementNode / RootElement: the resulting snapshot

pub mod attributes;
pub mod element;
pub mod frames;
pub mod identifier;
pub mod path;
pub mod path_index;
pub mod tree;

pub use attributes::{AttributeValue, Attributes, DefaultValueFinder};
pub use element::{ElementNode, RootElement};
pub use frames::FrameConverter;
pub use identifier::{HashIdProvider, IdProvider};
pub use path::{Path, Step};
pub use path_index::{FlatMap, PathIndex, RawRecord};
pub use tree::TreeBuilder;
