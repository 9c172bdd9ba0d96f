//! Task board view model.
//!
//! # Responsibility
//! - Hold the session's task collection and derive column views from it.
//! - Apply create/update/delete after remote confirmation and moves
//!   optimistically, reconciling them against the remote store.
//!
//! # Invariants
//! - Task ids in the collection are unique.
//! - A failed operation leaves the board usable for the next one.

pub mod editor;
pub mod view;
pub mod view_model;
