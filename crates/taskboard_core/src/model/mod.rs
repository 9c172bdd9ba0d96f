//! Task board domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by the board and remote stores.
//!
//! # Invariants
//! - Every task is identified by a store-assigned `TaskId`.
//! - Status values form a closed set; unknown labels never reach the board.

pub mod task;
