use time::OffsetDateTime;

use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{BookId, Borrow, BorrowId, UserId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait BorrowQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &BorrowId,
    ) -> error_stack::Result<Option<Borrow>, KernelError>;
    async fn find_by_id_for_update(
        &self,
        con: &mut Self::Transaction,
        id: &BorrowId,
    ) -> error_stack::Result<Option<Borrow>, KernelError>;
    /// The borrower's non-returned borrow of the book, if any.
    async fn find_active(
        &self,
        con: &mut Self::Transaction,
        borrower_id: &UserId,
        book_id: &BookId,
    ) -> error_stack::Result<Option<Borrow>, KernelError>;
    async fn count_active_by_book(
        &self,
        con: &mut Self::Transaction,
        book_id: &BookId,
    ) -> error_stack::Result<i64, KernelError>;
    async fn count_active(
        &self,
        con: &mut Self::Transaction,
    ) -> error_stack::Result<i64, KernelError>;
    /// Active borrows with `from <= due_at < until`.
    async fn count_active_due_between(
        &self,
        con: &mut Self::Transaction,
        from: &OffsetDateTime,
        until: &OffsetDateTime,
    ) -> error_stack::Result<i64, KernelError>;
}

pub trait DependOnBorrowQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type BorrowQuery: BorrowQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn borrow_query(&self) -> &Self::BorrowQuery;
}
