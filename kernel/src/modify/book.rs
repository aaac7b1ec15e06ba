use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Book, BookAvailable, BookId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait BookModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn create(
        &self,
        con: &mut Self::Transaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError>;
    /// Writes every field except `available`, which only
    /// [`BookModifier::update_availability`] touches.
    async fn update(
        &self,
        con: &mut Self::Transaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError>;
    async fn update_availability(
        &self,
        con: &mut Self::Transaction,
        book_id: &BookId,
        available: &BookAvailable,
    ) -> error_stack::Result<(), KernelError>;
    /// Removes the book together with its returned borrow history.
    async fn delete(
        &self,
        con: &mut Self::Transaction,
        book_id: &BookId,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnBookModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type BookModifier: BookModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn book_modifier(&self) -> &Self::BookModifier;
}
