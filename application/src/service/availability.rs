use error_stack::Report;

use kernel::interface::database::DatabaseConnection;
use kernel::interface::query::{
    BookQuery, BorrowQuery, DependOnBookQuery, DependOnBorrowQuery,
};
use kernel::interface::update::{BookModifier, DependOnBookModifier};
use kernel::prelude::entity::{BookAvailable, BookId};
use kernel::{EntityKind, KernelError};

/// Keeps `Book.available` equal to `active borrows < total_copies`.
///
/// Every entry point takes the caller's open transaction, so the flag changes in the
/// same commit as the borrow that caused it. The value is always recomputed from the
/// active-borrow count rather than adjusted by a delta.
#[async_trait::async_trait]
pub trait AvailabilityTracker:
    'static + Sync + Send + DependOnBookQuery + DependOnBorrowQuery + DependOnBookModifier
{
    async fn on_borrow_created(
        &self,
        con: &mut <Self::DatabaseConnection as DatabaseConnection>::Transaction,
        book_id: &BookId,
    ) -> error_stack::Result<BookAvailable, KernelError> {
        self.recompute_availability(con, book_id).await
    }

    async fn on_borrow_returned(
        &self,
        con: &mut <Self::DatabaseConnection as DatabaseConnection>::Transaction,
        book_id: &BookId,
    ) -> error_stack::Result<BookAvailable, KernelError> {
        self.recompute_availability(con, book_id).await
    }

    async fn recompute_availability(
        &self,
        con: &mut <Self::DatabaseConnection as DatabaseConnection>::Transaction,
        book_id: &BookId,
    ) -> error_stack::Result<BookAvailable, KernelError> {
        let book = self
            .book_query()
            .find_by_id_for_update(con, book_id)
            .await?
            .ok_or_else(|| Report::new(KernelError::NotFound(EntityKind::Book)))?;
        let active = self
            .borrow_query()
            .count_active_by_book(con, book_id)
            .await?;
        // Copies shrunk below the lent count out of band still derive `false`.
        let available = BookAvailable::derive(active, book.total_copies());
        if &available != book.available() {
            self.book_modifier()
                .update_availability(con, book_id, &available)
                .await?;
        }
        Ok(available)
    }
}

impl<T> AvailabilityTracker for T where
    T: DependOnBookQuery + DependOnBorrowQuery + DependOnBookModifier
{
}
