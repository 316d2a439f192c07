// ABOUTME: Static entity graph (C5): loads a JSON entity list and serves scored lookups
// ABOUTME: deliberately flat, unlike a bi-temporal knowledge graph — this graph never mutates

//! A small, static, in-memory graph of named entities, loaded once at
//! startup from a JSON file and queried by keyword overlap. This is not a
//! general knowledge graph — there is no traversal, no persistence layer,
//! and no temporal versioning, because the spec's Entity Graph component is
//! scoped to "small static graph... with scored lookup".

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod entity;
pub mod error;
pub mod graph;

pub use entity::Entity;
pub use error::{GraphError, Result};
pub use graph::EntityGraph;
