use crate::controller::Exhaust;
use application::transfer::{
    BorrowSummaryDto, DashboardReportDto, DashboardSummaryDto, OverdueMemberDto,
};
use axum::Json;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct BorrowedBookResponse {
    id: Uuid,
    title: String,
    author: String,
    genre: String,
    isbn: String,
}

#[derive(Debug, Serialize)]
pub struct BorrowSummaryResponse {
    id: Uuid,
    book: BorrowedBookResponse,
    #[serde(with = "time::serde::rfc3339")]
    borrowed_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    due_at: OffsetDateTime,
    days_until_due: i64,
}

impl From<BorrowSummaryDto> for BorrowSummaryResponse {
    fn from(value: BorrowSummaryDto) -> Self {
        Self {
            id: value.id,
            book: BorrowedBookResponse {
                id: value.book.id,
                title: value.book.title,
                author: value.book.author,
                genre: value.book.genre,
                isbn: value.book.isbn,
            },
            borrowed_at: value.borrowed_at,
            due_at: value.due_at,
            days_until_due: value.days_until_due,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OverdueMemberResponse {
    member_id: Uuid,
    member_name: String,
    member_email: String,
    book_title: String,
    book_author: String,
    #[serde(with = "time::serde::rfc3339")]
    borrowed_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    due_at: OffsetDateTime,
    days_overdue: i64,
}

impl From<OverdueMemberDto> for OverdueMemberResponse {
    fn from(value: OverdueMemberDto) -> Self {
        Self {
            member_id: value.member_id,
            member_name: value.member_name,
            member_email: value.member_email,
            book_title: value.book_title,
            book_author: value.book_author,
            borrowed_at: value.borrowed_at,
            due_at: value.due_at,
            days_overdue: value.days_overdue,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum DashboardResponse {
    Member {
        borrowed_books: Vec<BorrowSummaryResponse>,
    },
    Librarian {
        total_books: i64,
        total_borrowed_books: i64,
        books_due_today: i64,
        overdue_members: Vec<OverdueMemberResponse>,
    },
}

pub struct Presenter;

impl Exhaust<DashboardReportDto> for Presenter {
    type To = Json<DashboardResponse>;
    fn emit(&self, input: DashboardReportDto) -> Self::To {
        let response = match input {
            DashboardReportDto::Member { borrowed_books } => DashboardResponse::Member {
                borrowed_books: borrowed_books
                    .into_iter()
                    .map(BorrowSummaryResponse::from)
                    .collect(),
            },
            DashboardReportDto::Librarian(DashboardSummaryDto {
                total_books,
                total_borrowed_books,
                books_due_today,
                overdue_members,
            }) => DashboardResponse::Librarian {
                total_books,
                total_borrowed_books,
                books_due_today,
                overdue_members: overdue_members
                    .into_iter()
                    .map(OverdueMemberResponse::from)
                    .collect(),
            },
        };
        Json(response)
    }
}
