// ABOUTME: Text tokenization, stopword filtering, and bounded filesystem walks
// ABOUTME: shared by the keyword scanner, code symbol index, and entity graph

//! Small, dependency-light helpers reused by several retrievers so that
//! "pick a salient token" and "walk the project tree with a cap" are
//! implemented once.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod fs;
pub mod text;
