use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Book, BookId, BookIsbn, SelectLimit, SelectOffset};
use crate::KernelError;

#[async_trait::async_trait]
pub trait BookQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError>;
    /// Same as [`BookQuery::find_by_id`] but holds a row lock on the book until the
    /// transaction ends, serializing every writer of the book's borrows.
    async fn find_by_id_for_update(
        &self,
        con: &mut Self::Transaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError>;
    async fn find_by_isbn(
        &self,
        con: &mut Self::Transaction,
        isbn: &BookIsbn,
    ) -> error_stack::Result<Option<Book>, KernelError>;
    async fn find_all(
        &self,
        con: &mut Self::Transaction,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Book>, KernelError>;
    async fn count(&self, con: &mut Self::Transaction) -> error_stack::Result<i64, KernelError>;
}

pub trait DependOnBookQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type BookQuery: BookQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn book_query(&self) -> &Self::BookQuery;
}
