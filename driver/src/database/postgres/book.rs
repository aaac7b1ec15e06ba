use sqlx::PgConnection;
use uuid::Uuid;

use kernel::interface::query::{BookQuery, DependOnBookQuery};
use kernel::interface::update::{BookModifier, DependOnBookModifier};
use kernel::prelude::entity::{
    Book, BookAuthor, BookAvailable, BookGenre, BookId, BookIsbn, BookTitle, BookTotalCopies,
    SelectLimit, SelectOffset,
};
use kernel::KernelError;

use crate::database::postgres::{touched_row, PostgresDatabase, PostgresTransaction};
use crate::error::ConvertError;

pub struct PostgresBookRepository;

#[async_trait::async_trait]
impl BookQuery for PostgresBookRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::find_by_id(con, id).await
    }

    async fn find_by_id_for_update(
        &self,
        con: &mut PostgresTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::find_by_id_for_update(con, id).await
    }

    async fn find_by_isbn(
        &self,
        con: &mut PostgresTransaction,
        isbn: &BookIsbn,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::find_by_isbn(con, isbn).await
    }

    async fn find_all(
        &self,
        con: &mut PostgresTransaction,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        PgBookInternal::find_all(con, limit, offset).await
    }

    async fn count(&self, con: &mut PostgresTransaction) -> error_stack::Result<i64, KernelError> {
        PgBookInternal::count(con).await
    }
}

#[async_trait::async_trait]
impl BookModifier for PostgresBookRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::create(con, book).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::update(con, book).await
    }

    async fn update_availability(
        &self,
        con: &mut PostgresTransaction,
        book_id: &BookId,
        available: &BookAvailable,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::update_availability(con, book_id, available).await
    }

    async fn delete(
        &self,
        con: &mut PostgresTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::delete(con, book_id).await
    }
}

impl DependOnBookQuery for PostgresDatabase {
    type BookQuery = PostgresBookRepository;
    fn book_query(&self) -> &Self::BookQuery {
        &PostgresBookRepository
    }
}

impl DependOnBookModifier for PostgresDatabase {
    type BookModifier = PostgresBookRepository;
    fn book_modifier(&self) -> &Self::BookModifier {
        &PostgresBookRepository
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id: Uuid,
    title: String,
    author: String,
    genre: String,
    isbn: String,
    total_copies: i32,
    available: bool,
}

impl From<BookRow> for Book {
    fn from(value: BookRow) -> Self {
        Book::new(
            BookId::new(value.id),
            BookTitle::new(value.title),
            BookAuthor::new(value.author),
            BookGenre::new(value.genre),
            BookIsbn::new(value.isbn),
            BookTotalCopies::new(value.total_copies),
            BookAvailable::new(value.available),
        )
    }
}

pub(in crate::database) struct PgBookInternal;

impl PgBookInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title, author, genre, isbn, total_copies, available
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Book::from))
    }

    async fn find_by_id_for_update(
        con: &mut PgConnection,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title, author, genre, isbn, total_copies, available
            FROM books
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Book::from))
    }

    async fn find_by_isbn(
        con: &mut PgConnection,
        isbn: &BookIsbn,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title, author, genre, isbn, total_copies, available
            FROM books
            WHERE isbn = $1
            "#,
        )
        .bind(isbn.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Book::from))
    }

    async fn find_all(
        con: &mut PgConnection,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let rows = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title, author, genre, isbn, total_copies, available
            FROM books
            ORDER BY title, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit.as_ref())
        .bind(offset.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn count(con: &mut PgConnection) -> error_stack::Result<i64, KernelError> {
        // language=postgresql
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM books")
            .fetch_one(con)
            .await
            .convert_error()
    }

    async fn create(con: &mut PgConnection, book: &Book) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        sqlx::query(
            r#"
            INSERT INTO books (id, title, author, genre, isbn, total_copies, available)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(book.id().as_ref())
        .bind(book.title().as_ref())
        .bind(book.author().as_ref())
        .bind(book.genre().as_ref())
        .bind(book.isbn().as_ref())
        .bind(book.total_copies().as_ref())
        .bind(book.available().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn update(con: &mut PgConnection, book: &Book) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $2, author = $3, genre = $4, isbn = $5, total_copies = $6
            WHERE id = $1
            "#,
        )
        .bind(book.id().as_ref())
        .bind(book.title().as_ref())
        .bind(book.author().as_ref())
        .bind(book.genre().as_ref())
        .bind(book.isbn().as_ref())
        .bind(book.total_copies().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        touched_row(result, "update of a missing book")
    }

    async fn update_availability(
        con: &mut PgConnection,
        book_id: &BookId,
        available: &BookAvailable,
    ) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        let result = sqlx::query(
            r#"
            UPDATE books
            SET available = $2
            WHERE id = $1
            "#,
        )
        .bind(book_id.as_ref())
        .bind(available.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        touched_row(result, "availability of a missing book")
    }

    async fn delete(con: &mut PgConnection, book_id: &BookId) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        sqlx::query(
            r#"
            DELETE FROM borrows
            WHERE book_id = $1 AND returned
            "#,
        )
        .bind(book_id.as_ref())
        .execute(&mut *con)
        .await
        .convert_error()?;
        // language=postgresql
        sqlx::query(
            r#"
            DELETE FROM books
            WHERE id = $1
            "#,
        )
        .bind(book_id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use kernel::interface::database::{DatabaseConnection, Transaction};
    use kernel::interface::query::BookQuery;
    use kernel::interface::update::BookModifier;
    use kernel::prelude::entity::{BookAvailable, BookTitle, SelectLimit, SelectOffset};
    use kernel::KernelError;

    use crate::database::postgres::test_support;
    use crate::database::postgres::{PostgresBookRepository, PostgresDatabase};

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;

        let book = test_support::book(1);
        let id = book.id().clone();
        PostgresBookRepository.create(&mut con, &book).await?;

        let found = PostgresBookRepository.find_by_id(&mut con, &id).await?;
        assert_eq!(found, Some(book.clone()));
        let found = PostgresBookRepository
            .find_by_isbn(&mut con, book.isbn())
            .await?;
        assert_eq!(found, Some(book.clone()));

        let mut book = book;
        book.substitute(|b| *b.title = BookTitle::new("test2"));
        PostgresBookRepository.update(&mut con, &book).await?;
        let found = PostgresBookRepository
            .find_by_id_for_update(&mut con, &id)
            .await?;
        assert_eq!(found, Some(book.clone()));

        PostgresBookRepository
            .update_availability(&mut con, &id, &BookAvailable::new(false))
            .await?;
        let found = PostgresBookRepository.find_by_id(&mut con, &id).await?;
        assert_eq!(found.map(|b| *b.available()), Some(BookAvailable::new(false)));

        let listed = PostgresBookRepository
            .find_all(&mut con, &SelectLimit::new(100), &SelectOffset::default())
            .await?;
        assert!(listed.iter().any(|b| b.id() == &id));
        assert!(PostgresBookRepository.count(&mut con).await? >= 1);

        PostgresBookRepository.delete(&mut con, &id).await?;
        let found = PostgresBookRepository.find_by_id(&mut con, &id).await?;
        assert!(found.is_none());

        con.roll_back().await?;
        Ok(())
    }
}
