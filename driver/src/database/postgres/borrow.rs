use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::query::{BorrowQuery, DependOnBorrowQuery};
use kernel::interface::update::{BorrowModifier, DependOnBorrowModifier};
use kernel::prelude::entity::{
    BookId, Borrow, BorrowId, BorrowedAt, DueAt, Returned, UserId,
};
use kernel::KernelError;

use crate::database::postgres::{touched_row, PostgresDatabase, PostgresTransaction};
use crate::error::ConvertError;

pub struct PostgresBorrowRepository;

#[async_trait::async_trait]
impl BorrowQuery for PostgresBorrowRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &BorrowId,
    ) -> error_stack::Result<Option<Borrow>, KernelError> {
        PgBorrowInternal::find_by_id(con, id, false).await
    }

    async fn find_by_id_for_update(
        &self,
        con: &mut PostgresTransaction,
        id: &BorrowId,
    ) -> error_stack::Result<Option<Borrow>, KernelError> {
        PgBorrowInternal::find_by_id(con, id, true).await
    }

    async fn find_active(
        &self,
        con: &mut PostgresTransaction,
        borrower_id: &UserId,
        book_id: &BookId,
    ) -> error_stack::Result<Option<Borrow>, KernelError> {
        PgBorrowInternal::find_active(con, borrower_id, book_id).await
    }

    async fn count_active_by_book(
        &self,
        con: &mut PostgresTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<i64, KernelError> {
        PgBorrowInternal::count_active_by_book(con, book_id).await
    }

    async fn count_active(
        &self,
        con: &mut PostgresTransaction,
    ) -> error_stack::Result<i64, KernelError> {
        PgBorrowInternal::count_active(con).await
    }

    async fn count_active_due_between(
        &self,
        con: &mut PostgresTransaction,
        from: &OffsetDateTime,
        until: &OffsetDateTime,
    ) -> error_stack::Result<i64, KernelError> {
        PgBorrowInternal::count_active_due_between(con, from, until).await
    }
}

#[async_trait::async_trait]
impl BorrowModifier for PostgresBorrowRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        borrow: &Borrow,
    ) -> error_stack::Result<(), KernelError> {
        PgBorrowInternal::create(con, borrow).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        borrow: &Borrow,
    ) -> error_stack::Result<(), KernelError> {
        PgBorrowInternal::update(con, borrow).await
    }
}

impl DependOnBorrowQuery for PostgresDatabase {
    type BorrowQuery = PostgresBorrowRepository;
    fn borrow_query(&self) -> &Self::BorrowQuery {
        &PostgresBorrowRepository
    }
}

impl DependOnBorrowModifier for PostgresDatabase {
    type BorrowModifier = PostgresBorrowRepository;
    fn borrow_modifier(&self) -> &Self::BorrowModifier {
        &PostgresBorrowRepository
    }
}

#[derive(sqlx::FromRow)]
struct BorrowRow {
    id: Uuid,
    borrower_id: Uuid,
    book_id: Uuid,
    borrowed_at: OffsetDateTime,
    due_at: OffsetDateTime,
    returned: bool,
}

impl From<BorrowRow> for Borrow {
    fn from(value: BorrowRow) -> Self {
        Borrow::new(
            BorrowId::new(value.id),
            UserId::new(value.borrower_id),
            BookId::new(value.book_id),
            BorrowedAt::new(value.borrowed_at),
            DueAt::new(value.due_at),
            Returned::new(value.returned),
        )
    }
}

pub(in crate::database) struct PgBorrowInternal;

impl PgBorrowInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &BorrowId,
        lock: bool,
    ) -> error_stack::Result<Option<Borrow>, KernelError> {
        // language=postgresql
        let query = if lock {
            r#"
            SELECT id, borrower_id, book_id, borrowed_at, due_at, returned
            FROM borrows
            WHERE id = $1
            FOR UPDATE
            "#
        } else {
            r#"
            SELECT id, borrower_id, book_id, borrowed_at, due_at, returned
            FROM borrows
            WHERE id = $1
            "#
        };
        let row = sqlx::query_as::<_, BorrowRow>(query)
            .bind(id.as_ref())
            .fetch_optional(con)
            .await
            .convert_error()?;
        Ok(row.map(Borrow::from))
    }

    async fn find_active(
        con: &mut PgConnection,
        borrower_id: &UserId,
        book_id: &BookId,
    ) -> error_stack::Result<Option<Borrow>, KernelError> {
        let row = sqlx::query_as::<_, BorrowRow>(
            // language=postgresql
            r#"
            SELECT id, borrower_id, book_id, borrowed_at, due_at, returned
            FROM borrows
            WHERE borrower_id = $1 AND book_id = $2 AND NOT returned
            "#,
        )
        .bind(borrower_id.as_ref())
        .bind(book_id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Borrow::from))
    }

    async fn count_active_by_book(
        con: &mut PgConnection,
        book_id: &BookId,
    ) -> error_stack::Result<i64, KernelError> {
        // language=postgresql
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM borrows
            WHERE book_id = $1 AND NOT returned
            "#,
        )
        .bind(book_id.as_ref())
        .fetch_one(con)
        .await
        .convert_error()
    }

    async fn count_active(con: &mut PgConnection) -> error_stack::Result<i64, KernelError> {
        // language=postgresql
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM borrows WHERE NOT returned")
            .fetch_one(con)
            .await
            .convert_error()
    }

    async fn count_active_due_between(
        con: &mut PgConnection,
        from: &OffsetDateTime,
        until: &OffsetDateTime,
    ) -> error_stack::Result<i64, KernelError> {
        // language=postgresql
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM borrows
            WHERE NOT returned AND due_at >= $1 AND due_at < $2
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_one(con)
        .await
        .convert_error()
    }

    async fn create(con: &mut PgConnection, borrow: &Borrow) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        sqlx::query(
            r#"
            INSERT INTO borrows (id, borrower_id, book_id, borrowed_at, due_at, returned)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(borrow.id().as_ref())
        .bind(borrow.borrower_id().as_ref())
        .bind(borrow.book_id().as_ref())
        .bind(borrow.borrowed_at().as_ref())
        .bind(borrow.due_at().as_ref())
        .bind(borrow.returned().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn update(con: &mut PgConnection, borrow: &Borrow) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        let result = sqlx::query(
            r#"
            UPDATE borrows
            SET due_at = $2, returned = $3
            WHERE id = $1
            "#,
        )
        .bind(borrow.id().as_ref())
        .bind(borrow.due_at().as_ref())
        .bind(borrow.returned().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        touched_row(result, "update of a missing borrow")
    }
}

#[cfg(test)]
mod test {
    use time::{Duration, OffsetDateTime};

    use kernel::interface::database::{DatabaseConnection, Transaction};
    use kernel::interface::query::BorrowQuery;
    use kernel::interface::update::{BookModifier, BorrowModifier, UserModifier};
    use kernel::prelude::entity::{Borrow, DueAt, UserRole};
    use kernel::{ConflictKind, KernelError};

    use crate::database::postgres::test_support;
    use crate::database::postgres::{
        PostgresBookRepository, PostgresBorrowRepository, PostgresDatabase,
        PostgresUserRepository,
    };

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;

        let book = test_support::book(2);
        let user = test_support::user(UserRole::Member);
        PostgresBookRepository.create(&mut con, &book).await?;
        PostgresUserRepository.create(&mut con, &user).await?;

        let now = OffsetDateTime::now_utc();
        let mut borrow = Borrow::open(user.id().clone(), book.id().clone(), now);
        PostgresBorrowRepository.create(&mut con, &borrow).await?;

        let found = PostgresBorrowRepository
            .find_by_id_for_update(&mut con, borrow.id())
            .await?;
        assert_eq!(found.as_ref().map(Borrow::id), Some(borrow.id()));
        let found = PostgresBorrowRepository
            .find_active(&mut con, user.id(), book.id())
            .await?;
        assert_eq!(found.as_ref().map(Borrow::id), Some(borrow.id()));
        let active = PostgresBorrowRepository
            .count_active_by_book(&mut con, book.id())
            .await?;
        assert_eq!(active, 1);
        let due = PostgresBorrowRepository
            .count_active_due_between(&mut con, &now, &(now + Duration::days(15)))
            .await?;
        assert!(due >= 1);

        borrow.reschedule(DueAt::new(now + Duration::days(3)));
        borrow.mark_returned();
        PostgresBorrowRepository.update(&mut con, &borrow).await?;
        let found = PostgresBorrowRepository
            .find_active(&mut con, user.id(), book.id())
            .await?;
        assert!(found.is_none());
        let active = PostgresBorrowRepository
            .count_active_by_book(&mut con, book.id())
            .await?;
        assert_eq!(active, 0);

        con.roll_back().await?;
        Ok(())
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn second_active_borrow_is_a_conflict() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;

        let book = test_support::book(2);
        let user = test_support::user(UserRole::Member);
        PostgresBookRepository.create(&mut con, &book).await?;
        PostgresUserRepository.create(&mut con, &user).await?;

        let now = OffsetDateTime::now_utc();
        let first = Borrow::open(user.id().clone(), book.id().clone(), now);
        PostgresBorrowRepository.create(&mut con, &first).await?;
        let second = Borrow::open(user.id().clone(), book.id().clone(), now);
        let error = PostgresBorrowRepository
            .create(&mut con, &second)
            .await
            .expect_err("only one active borrow per borrower and book");
        assert_eq!(
            error.current_context(),
            &KernelError::Conflict(ConflictKind::AlreadyBorrowed)
        );

        con.roll_back().await?;
        Ok(())
    }
}
