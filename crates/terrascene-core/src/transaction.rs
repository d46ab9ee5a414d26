//! Storage transaction abstraction.
//!
//! Multi-aggregate orchestrations open a transaction before touching any
//! store and commit only at the very end. Dropping a [`Transaction`] without
//! committing aborts it, so every early return and `?` rolls back.

use async_trait::async_trait;

use crate::error::DomainError;

/// Starts storage transactions.
#[async_trait]
pub trait TransactionManager: Send + Sync {
    /// Begins a new transaction.
    async fn begin(&self) -> Result<Box<dyn Transaction>, DomainError>;
}

/// An open storage transaction. Aborts on drop unless committed.
#[async_trait]
pub trait Transaction: Send {
    /// Commits every write made since the transaction began.
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;
}
