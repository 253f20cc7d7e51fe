//! Project and session catalog over per-project JSONL interaction logs.
//!
//! The log root holds one directory per project, named by encoding the
//! project's working-directory path. Each directory holds append-only
//! `.jsonl` session logs. This crate turns that layout into project and
//! session records: it resolves each project's authoritative working
//! directory by voting over historical log entries, merges sessions across
//! files with first-seen-wins deduplication, and layers persisted overrides
//! (display names, manually-added projects) on top.
//!
//! The crate is a library; a request layer owns transport and polling. Pair
//! [`infra::ProjectCatalog`] with [`infra::watch_projects_root`] and call
//! [`infra::ProjectCatalog::invalidate`] on change signals.

pub mod domain;
pub mod infra;

pub use domain::{Project, Session, SessionPage, SessionWindow};
pub use infra::ProjectCatalog;
