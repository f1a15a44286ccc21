//! Felt - a markdown-backed task tracker with a dependency graph.
//!
//! Every fiber is a markdown file with YAML frontmatter inside a `.felt/`
//! directory. This crate provides the `felt` CLI and the library it is built
//! from: the fiber domain model, file storage, id generation and output
//! rendering. Graph queries are delegated to [`felt_graph`].

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod domain;
pub mod error;
pub mod id_generation;
pub mod storage;

// Public CLI module (needed by binary)
pub mod cli;

// Command implementations
pub mod commands;

// Command context and rendering
pub mod app;
pub mod output;
