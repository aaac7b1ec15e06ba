use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::query::{DependOnReportQuery, LoanedBook, OverdueLoan, ReportQuery};
use kernel::prelude::entity::{
    Book, BookAuthor, BookAvailable, BookGenre, BookId, BookIsbn, BookTitle, BookTotalCopies,
    Borrow, BorrowId, BorrowedAt, DueAt, Returned, User, UserEmail, UserId, UserName, UserRole,
};
use kernel::KernelError;

use crate::database::postgres::{PostgresDatabase, PostgresTransaction};
use crate::error::ConvertError;

pub struct PostgresReportRepository;

#[async_trait::async_trait]
impl ReportQuery for PostgresReportRepository {
    type Transaction = PostgresTransaction;

    async fn find_loans_by_borrower(
        &self,
        con: &mut PostgresTransaction,
        borrower_id: &UserId,
    ) -> error_stack::Result<Vec<LoanedBook>, KernelError> {
        PgReportInternal::find_loans_by_borrower(con, borrower_id).await
    }

    async fn find_overdue_loans(
        &self,
        con: &mut PostgresTransaction,
        before: &OffsetDateTime,
    ) -> error_stack::Result<Vec<OverdueLoan>, KernelError> {
        PgReportInternal::find_overdue_loans(con, before).await
    }
}

impl DependOnReportQuery for PostgresDatabase {
    type ReportQuery = PostgresReportRepository;
    fn report_query(&self) -> &Self::ReportQuery {
        &PostgresReportRepository
    }
}

#[derive(sqlx::FromRow)]
struct LoanRow {
    borrow_id: Uuid,
    borrower_id: Uuid,
    borrowed_at: OffsetDateTime,
    due_at: OffsetDateTime,
    returned: bool,
    book_id: Uuid,
    title: String,
    author: String,
    genre: String,
    isbn: String,
    total_copies: i32,
    available: bool,
}

impl LoanRow {
    fn split(self) -> (Borrow, Book) {
        let borrow = Borrow::new(
            BorrowId::new(self.borrow_id),
            UserId::new(self.borrower_id),
            BookId::new(self.book_id),
            BorrowedAt::new(self.borrowed_at),
            DueAt::new(self.due_at),
            Returned::new(self.returned),
        );
        let book = Book::new(
            BookId::new(self.book_id),
            BookTitle::new(self.title),
            BookAuthor::new(self.author),
            BookGenre::new(self.genre),
            BookIsbn::new(self.isbn),
            BookTotalCopies::new(self.total_copies),
            BookAvailable::new(self.available),
        );
        (borrow, book)
    }
}

#[derive(sqlx::FromRow)]
struct OverdueRow {
    #[sqlx(flatten)]
    loan: LoanRow,
    user_name: String,
    user_email: String,
    user_role: String,
}

impl TryFrom<OverdueRow> for OverdueLoan {
    type Error = error_stack::Report<KernelError>;
    fn try_from(value: OverdueRow) -> Result<Self, Self::Error> {
        let role = value.user_role.parse::<UserRole>()?;
        let (borrow, book) = value.loan.split();
        let borrower = User::new(
            borrow.borrower_id().clone(),
            UserName::new(value.user_name),
            UserEmail::new(value.user_email),
            role,
        );
        Ok(OverdueLoan::new(borrow, book, borrower))
    }
}

pub(in crate::database) struct PgReportInternal;

impl PgReportInternal {
    async fn find_loans_by_borrower(
        con: &mut PgConnection,
        borrower_id: &UserId,
    ) -> error_stack::Result<Vec<LoanedBook>, KernelError> {
        let rows = sqlx::query_as::<_, LoanRow>(
            // language=postgresql
            r#"
            SELECT borrows.id AS borrow_id, borrows.borrower_id, borrows.borrowed_at,
                   borrows.due_at, borrows.returned,
                   books.id AS book_id, books.title, books.author, books.genre, books.isbn,
                   books.total_copies, books.available
            FROM borrows
            JOIN books ON books.id = borrows.book_id
            WHERE borrows.borrower_id = $1 AND NOT borrows.returned
            ORDER BY borrows.due_at, borrows.id
            "#,
        )
        .bind(borrower_id.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let (borrow, book) = row.split();
                LoanedBook::new(borrow, book)
            })
            .collect())
    }

    async fn find_overdue_loans(
        con: &mut PgConnection,
        before: &OffsetDateTime,
    ) -> error_stack::Result<Vec<OverdueLoan>, KernelError> {
        let rows = sqlx::query_as::<_, OverdueRow>(
            // language=postgresql
            r#"
            SELECT borrows.id AS borrow_id, borrows.borrower_id, borrows.borrowed_at,
                   borrows.due_at, borrows.returned,
                   books.id AS book_id, books.title, books.author, books.genre, books.isbn,
                   books.total_copies, books.available,
                   users.name AS user_name, users.email AS user_email, users.role AS user_role
            FROM borrows
            JOIN books ON books.id = borrows.book_id
            JOIN users ON users.id = borrows.borrower_id
            WHERE NOT borrows.returned AND borrows.due_at < $1
            ORDER BY borrows.due_at, borrows.id
            "#,
        )
        .bind(before)
        .fetch_all(con)
        .await
        .convert_error()?;
        rows.into_iter().map(OverdueLoan::try_from).collect()
    }
}

#[cfg(test)]
mod test {
    use time::{Duration, OffsetDateTime};

    use kernel::interface::database::{DatabaseConnection, Transaction};
    use kernel::interface::query::ReportQuery;
    use kernel::interface::update::{BookModifier, BorrowModifier, UserModifier};
    use kernel::prelude::entity::{Borrow, UserRole};
    use kernel::KernelError;

    use crate::database::postgres::test_support;
    use crate::database::postgres::{
        PostgresBookRepository, PostgresBorrowRepository, PostgresDatabase,
        PostgresReportRepository, PostgresUserRepository,
    };

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;

        let book = test_support::book(1);
        let user = test_support::user(UserRole::Member);
        PostgresBookRepository.create(&mut con, &book).await?;
        PostgresUserRepository.create(&mut con, &user).await?;

        let long_ago = OffsetDateTime::now_utc() - Duration::days(400);
        let borrow = Borrow::open(user.id().clone(), book.id().clone(), long_ago);
        PostgresBorrowRepository.create(&mut con, &borrow).await?;

        let loans = PostgresReportRepository
            .find_loans_by_borrower(&mut con, user.id())
            .await?;
        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].book(), &book);
        assert_eq!(loans[0].borrow().id(), borrow.id());

        let overdue = PostgresReportRepository
            .find_overdue_loans(&mut con, &OffsetDateTime::now_utc())
            .await?;
        let mine = overdue
            .iter()
            .find(|loan| loan.borrow().id() == borrow.id())
            .map(|loan| loan.borrower().clone());
        assert_eq!(mine, Some(user.clone()));

        con.roll_back().await?;
        Ok(())
    }
}
