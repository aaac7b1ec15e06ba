use crate::controller::Intake;
use application::transfer::{CreateBorrowDto, GetBorrowDto, UpdateBorrowDto};
use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// Built from the path and the resolved actor, never from the body.
#[derive(Debug)]
pub struct CreateRequest {
    borrower_id: Uuid,
    book_id: Uuid,
    now: OffsetDateTime,
}

impl CreateRequest {
    pub fn new(borrower_id: Uuid, book_id: Uuid, now: OffsetDateTime) -> Self {
        Self {
            borrower_id,
            book_id,
            now,
        }
    }
}

#[derive(Debug)]
pub struct GetRequest {
    id: Uuid,
}

impl GetRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    returned: Option<bool>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    due_at: Option<OffsetDateTime>,
    borrower_id: Option<Uuid>,
    book_id: Option<Uuid>,
}

pub struct Transformer;

impl Intake<CreateRequest> for Transformer {
    type To = CreateBorrowDto;
    fn emit(&self, input: CreateRequest) -> Self::To {
        CreateBorrowDto {
            borrower_id: input.borrower_id,
            book_id: input.book_id,
            now: input.now,
        }
    }
}

impl Intake<GetRequest> for Transformer {
    type To = GetBorrowDto;
    fn emit(&self, input: GetRequest) -> Self::To {
        GetBorrowDto { id: input.id }
    }
}

impl Intake<(Uuid, UpdateRequest)> for Transformer {
    type To = UpdateBorrowDto;
    fn emit(&self, input: (Uuid, UpdateRequest)) -> Self::To {
        let (id, input) = input;
        UpdateBorrowDto {
            id,
            returned: input.returned,
            due_at: input.due_at,
            borrower_id: input.borrower_id,
            book_id: input.book_id,
        }
    }
}
