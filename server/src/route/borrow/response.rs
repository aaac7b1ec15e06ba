use crate::controller::Exhaust;
use application::transfer::BorrowDto;
use axum::Json;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct BorrowResponse {
    id: Uuid,
    borrower_id: Uuid,
    book_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    borrowed_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    due_at: OffsetDateTime,
    returned: bool,
}

pub struct Presenter;

impl Exhaust<BorrowDto> for Presenter {
    type To = Json<BorrowResponse>;
    fn emit(&self, input: BorrowDto) -> Self::To {
        Json(BorrowResponse {
            id: input.id,
            borrower_id: input.borrower_id,
            book_id: input.book_id,
            borrowed_at: input.borrowed_at,
            due_at: input.due_at,
            returned: input.returned,
        })
    }
}
