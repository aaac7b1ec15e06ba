use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::query::{DestructLoanedBook, LoanedBook};
use kernel::prelude::entity::{DestructBook, DestructBorrow};
use kernel::prelude::policy::Actor;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BorrowedBookDto {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub isbn: String,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BorrowSummaryDto {
    pub id: Uuid,
    pub book: BorrowedBookDto,
    pub borrowed_at: OffsetDateTime,
    pub due_at: OffsetDateTime,
    pub days_until_due: i64,
}

impl BorrowSummaryDto {
    pub fn summarize(loan: LoanedBook, now: &OffsetDateTime) -> Self {
        let days_until_due = loan.borrow().days_until_due(now);
        let DestructLoanedBook { borrow, book } = loan.into_destruct();
        let DestructBorrow {
            id,
            borrowed_at,
            due_at,
            ..
        } = borrow.into_destruct();
        let DestructBook {
            id: book_id,
            title,
            author,
            genre,
            isbn,
            ..
        } = book.into_destruct();
        Self {
            id: id.into(),
            book: BorrowedBookDto {
                id: book_id.into(),
                title: title.into(),
                author: author.into(),
                genre: genre.into(),
                isbn: isbn.into(),
            },
            borrowed_at: borrowed_at.into(),
            due_at: due_at.into(),
            days_until_due,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct OverdueMemberDto {
    pub member_id: Uuid,
    pub member_name: String,
    pub member_email: String,
    pub book_title: String,
    pub book_author: String,
    pub borrowed_at: OffsetDateTime,
    pub due_at: OffsetDateTime,
    pub days_overdue: i64,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DashboardSummaryDto {
    pub total_books: i64,
    pub total_borrowed_books: i64,
    pub books_due_today: i64,
    pub overdue_members: Vec<OverdueMemberDto>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DashboardReportDto {
    Member { borrowed_books: Vec<BorrowSummaryDto> },
    Librarian(DashboardSummaryDto),
}

pub struct MemberReportDto {
    pub user_id: Uuid,
    pub now: OffsetDateTime,
}

pub struct LibrarianReportDto {
    pub now: OffsetDateTime,
}

pub struct DashboardDto {
    pub actor: Actor,
    pub now: OffsetDateTime,
}
