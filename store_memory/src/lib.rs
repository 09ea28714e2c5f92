//! In-memory storage backend for the polling ledger.
//!
//! Implements all storage traits from `pollsys-store` over a single
//! [`StoreImage`](pollsys_store::StoreImage) guarded by a read-write lock.
//! Batches are applied with an undo log so a failing op rolls back the ops
//! before it.

pub mod memory;
mod undo;

pub use memory::MemoryStore;
