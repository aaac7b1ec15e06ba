use error_stack::Report;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{
    BookQuery, BorrowQuery, DependOnBookQuery, DependOnBorrowQuery, DependOnUserQuery, UserQuery,
};
use kernel::interface::update::{BorrowModifier, DependOnBorrowModifier};
use kernel::prelude::entity::{BookId, Borrow, BorrowId, DueAt, UserId};
use kernel::{ConflictKind, EntityKind, KernelError};

use crate::service::AvailabilityTracker;
use crate::transfer::{BorrowDto, CreateBorrowDto, GetBorrowDto, UpdateBorrowDto};

#[async_trait::async_trait]
pub trait GetBorrowService: 'static + Sync + Send + DependOnBorrowQuery {
    async fn get_borrow(
        &self,
        dto: GetBorrowDto,
    ) -> error_stack::Result<Option<BorrowDto>, KernelError> {
        let mut connection = self.database_connection().snapshot().await?;
        let id = BorrowId::new(dto.id);
        let borrow = self.borrow_query().find_by_id(&mut connection, &id).await?;
        connection.commit().await?;
        Ok(borrow.map(BorrowDto::from))
    }
}

impl<T> GetBorrowService for T where T: DependOnBorrowQuery {}

#[async_trait::async_trait]
pub trait CreateBorrowService:
    'static + Sync + Send + AvailabilityTracker + DependOnBorrowModifier + DependOnUserQuery
{
    /// Lends one copy of a book.
    ///
    /// The book row stays locked from the availability check until commit, so two
    /// callers racing for the last copy are serialized and the second one sees
    /// `available == false`.
    async fn create_borrow(
        &self,
        dto: CreateBorrowDto,
    ) -> error_stack::Result<BorrowDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let book_id = BookId::new(dto.book_id);
        let borrower_id = UserId::new(dto.borrower_id);

        let book = self
            .book_query()
            .find_by_id_for_update(&mut connection, &book_id)
            .await?
            .ok_or_else(|| Report::new(KernelError::NotFound(EntityKind::Book)))?;
        if !book.available().as_ref() {
            return Err(Report::new(KernelError::Conflict(
                ConflictKind::BookUnavailable,
            )));
        }

        let active = self
            .borrow_query()
            .find_active(&mut connection, &borrower_id, &book_id)
            .await?;
        if active.is_some() {
            return Err(Report::new(KernelError::Conflict(
                ConflictKind::AlreadyBorrowed,
            )));
        }

        self.user_query()
            .find_by_id(&mut connection, &borrower_id)
            .await?
            .ok_or_else(|| Report::new(KernelError::NotFound(EntityKind::User)))?;

        let borrow = Borrow::open(borrower_id, book_id, dto.now);
        self.borrow_modifier()
            .create(&mut connection, &borrow)
            .await?;
        self.on_borrow_created(&mut connection, borrow.book_id())
            .await?;

        connection.commit().await?;
        Ok(BorrowDto::from(borrow))
    }
}

impl<T> CreateBorrowService for T where
    T: AvailabilityTracker + DependOnBorrowModifier + DependOnUserQuery
{
}

#[async_trait::async_trait]
pub trait UpdateBorrowService:
    'static + Sync + Send + AvailabilityTracker + DependOnBorrowModifier
{
    /// Applies a patch of `returned` and `due_at`.
    ///
    /// Returning an already returned borrow is a no-op and never recomputes
    /// availability; a due date change in the same patch is still saved.
    async fn update_borrow(
        &self,
        dto: UpdateBorrowDto,
    ) -> error_stack::Result<BorrowDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = BorrowId::new(dto.id);
        let current = self
            .borrow_query()
            .find_by_id_for_update(&mut connection, &id)
            .await?
            .ok_or_else(|| Report::new(KernelError::NotFound(EntityKind::Borrow)))?;

        if dto
            .borrower_id
            .is_some_and(|borrower_id| &UserId::new(borrower_id) != current.borrower_id())
        {
            return Err(Report::new(KernelError::InvalidInput)
                .attach_printable("borrower of a borrow cannot be changed"));
        }
        if dto
            .book_id
            .is_some_and(|book_id| &BookId::new(book_id) != current.book_id())
        {
            return Err(Report::new(KernelError::InvalidInput)
                .attach_printable("book of a borrow cannot be changed"));
        }
        if dto.returned == Some(false) && !current.is_active() {
            return Err(Report::new(KernelError::InvalidInput)
                .attach_printable("a returned borrow cannot be reopened"));
        }
        let due_at = dto
            .due_at
            .map(|due_at| DueAt::try_new(due_at, current.borrowed_at()))
            .transpose()?;

        let mut borrow = current.clone();
        if let Some(due_at) = due_at {
            borrow.reschedule(due_at);
        }
        let returned_now = dto.returned == Some(true) && borrow.mark_returned();

        if borrow != current {
            self.borrow_modifier()
                .update(&mut connection, &borrow)
                .await?;
        }
        if returned_now {
            self.on_borrow_returned(&mut connection, borrow.book_id())
                .await?;
        }

        connection.commit().await?;
        Ok(BorrowDto::from(borrow))
    }
}

impl<T> UpdateBorrowService for T where T: AvailabilityTracker + DependOnBorrowModifier {}
