use time::OffsetDateTime;
use uuid::Uuid;

use kernel::prelude::entity::{Borrow, DestructBorrow};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BorrowDto {
    pub id: Uuid,
    pub borrower_id: Uuid,
    pub book_id: Uuid,
    pub borrowed_at: OffsetDateTime,
    pub due_at: OffsetDateTime,
    pub returned: bool,
}

impl From<Borrow> for BorrowDto {
    fn from(value: Borrow) -> Self {
        let DestructBorrow {
            id,
            borrower_id,
            book_id,
            borrowed_at,
            due_at,
            returned,
        } = value.into_destruct();
        Self {
            id: id.into(),
            borrower_id: borrower_id.into(),
            book_id: book_id.into(),
            borrowed_at: borrowed_at.into(),
            due_at: due_at.into(),
            returned: returned.into(),
        }
    }
}

pub struct GetBorrowDto {
    pub id: Uuid,
}

pub struct CreateBorrowDto {
    pub borrower_id: Uuid,
    pub book_id: Uuid,
    pub now: OffsetDateTime,
}

/// Only `returned` and `due_at` can change. `borrower_id` and `book_id` are accepted
/// so that an attempt to rewrite them can be rejected instead of silently ignored.
#[derive(Default)]
pub struct UpdateBorrowDto {
    pub id: Uuid,
    pub returned: Option<bool>,
    pub due_at: Option<OffsetDateTime>,
    pub borrower_id: Option<Uuid>,
    pub book_id: Option<Uuid>,
}
