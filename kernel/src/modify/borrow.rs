use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::Borrow;
use crate::KernelError;

/// Borrows are never deleted; history is kept.
#[async_trait::async_trait]
pub trait BorrowModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn create(
        &self,
        con: &mut Self::Transaction,
        borrow: &Borrow,
    ) -> error_stack::Result<(), KernelError>;
    /// Persists `due_at` and `returned`; borrower and book are immutable.
    async fn update(
        &self,
        con: &mut Self::Transaction,
        borrow: &Borrow,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnBorrowModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type BorrowModifier: BorrowModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn borrow_modifier(&self) -> &Self::BorrowModifier;
}
