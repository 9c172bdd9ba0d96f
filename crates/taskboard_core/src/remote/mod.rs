//! Remote store abstractions and implementations.
//!
//! # Responsibility
//! - Define the contract the board uses to read and write tasks remotely.
//! - Keep HTTP details behind that contract.
//!
//! # Invariants
//! - Store failures are classified as network, auth, rejection or invalid
//!   data; nothing else escapes a store.

pub mod http_store;
pub mod memory_store;
pub mod task_store;
