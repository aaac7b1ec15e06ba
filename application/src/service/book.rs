use error_stack::Report;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{BookQuery, BorrowQuery, DependOnBookQuery, DependOnBorrowQuery};
use kernel::interface::update::{BookModifier, DependOnBookModifier};
use kernel::prelude::entity::{
    Book, BookAuthor, BookAvailable, BookGenre, BookId, BookIsbn, BookTitle, BookTotalCopies,
    SelectLimit, SelectOffset,
};
use kernel::{ConflictKind, EntityKind, KernelError};

use crate::service::AvailabilityTracker;
use crate::transfer::{BookDto, CreateBookDto, DeleteBookDto, GetBookDto, GetBooksDto, UpdateBookDto};

#[async_trait::async_trait]
pub trait GetBookService: 'static + Sync + Send + DependOnBookQuery {
    async fn get_book(&self, dto: GetBookDto) -> error_stack::Result<Option<BookDto>, KernelError> {
        let mut connection = self.database_connection().snapshot().await?;
        let id = BookId::new(dto.id);
        let book = self.book_query().find_by_id(&mut connection, &id).await?;
        connection.commit().await?;
        Ok(book.map(BookDto::from))
    }

    async fn get_books(&self, dto: GetBooksDto) -> error_stack::Result<Vec<BookDto>, KernelError> {
        let mut connection = self.database_connection().snapshot().await?;
        let limit = dto.limit.map(SelectLimit::new).unwrap_or_default();
        let offset = dto.offset.map(SelectOffset::new).unwrap_or_default();
        let books = self
            .book_query()
            .find_all(&mut connection, &limit, &offset)
            .await?;
        connection.commit().await?;
        Ok(books.into_iter().map(BookDto::from).collect())
    }
}

impl<T> GetBookService for T where T: DependOnBookQuery {}

#[async_trait::async_trait]
pub trait CreateBookService:
    'static + Sync + Send + DependOnBookQuery + DependOnBookModifier
{
    async fn create_book(&self, dto: CreateBookDto) -> error_stack::Result<BookDto, KernelError> {
        let title = BookTitle::try_new(dto.title)?;
        let author = BookAuthor::try_new(dto.author)?;
        let genre = BookGenre::try_new(dto.genre)?;
        let isbn = BookIsbn::try_new(dto.isbn)?;
        let total_copies = BookTotalCopies::try_new(dto.total_copies)?;

        let mut connection = self.database_connection().transact().await?;
        if self
            .book_query()
            .find_by_isbn(&mut connection, &isbn)
            .await?
            .is_some()
        {
            return Err(Report::new(KernelError::Conflict(ConflictKind::IsbnTaken)));
        }

        let available = BookAvailable::derive(0, &total_copies);
        let book = Book::new(
            BookId::default(),
            title,
            author,
            genre,
            isbn,
            total_copies,
            available,
        );
        self.book_modifier().create(&mut connection, &book).await?;
        connection.commit().await?;

        Ok(BookDto::from(book))
    }
}

impl<T> CreateBookService for T where T: DependOnBookQuery + DependOnBookModifier {}

#[async_trait::async_trait]
pub trait UpdateBookService: 'static + Sync + Send + AvailabilityTracker {
    /// Changing `total_copies` recomputes availability in the same transaction. The
    /// copy count may not drop below the number of copies currently lent out.
    async fn update_book(&self, dto: UpdateBookDto) -> error_stack::Result<BookDto, KernelError> {
        let title = dto.title.map(BookTitle::try_new).transpose()?;
        let author = dto.author.map(BookAuthor::try_new).transpose()?;
        let genre = dto.genre.map(BookGenre::try_new).transpose()?;
        let isbn = dto.isbn.map(BookIsbn::try_new).transpose()?;
        let total_copies = dto.total_copies.map(BookTotalCopies::try_new).transpose()?;

        let mut connection = self.database_connection().transact().await?;
        let id = BookId::new(dto.id);
        let mut book = self
            .book_query()
            .find_by_id_for_update(&mut connection, &id)
            .await?
            .ok_or_else(|| Report::new(KernelError::NotFound(EntityKind::Book)))?;

        if let Some(isbn) = &isbn {
            let owner = self.book_query().find_by_isbn(&mut connection, isbn).await?;
            if owner.is_some_and(|other| other.id() != &id) {
                return Err(Report::new(KernelError::Conflict(ConflictKind::IsbnTaken)));
            }
        }
        if let Some(total_copies) = &total_copies {
            let active = self
                .borrow_query()
                .count_active_by_book(&mut connection, &id)
                .await?;
            if !total_copies.can_cover(active) {
                return Err(Report::new(KernelError::Conflict(ConflictKind::BookOnLoan))
                    .attach_printable(format!(
                        "{active} copies are on loan, total_copies cannot be {}",
                        total_copies.as_ref()
                    )));
            }
        }

        book.substitute(|book| {
            if let Some(title) = title {
                *book.title = title;
            }
            if let Some(author) = author {
                *book.author = author;
            }
            if let Some(genre) = genre {
                *book.genre = genre;
            }
            if let Some(isbn) = isbn {
                *book.isbn = isbn;
            }
            if let Some(total_copies) = total_copies {
                *book.total_copies = total_copies;
            }
        });
        self.book_modifier().update(&mut connection, &book).await?;
        let available = self.recompute_availability(&mut connection, &id).await?;
        book.substitute(|book| *book.available = available);

        connection.commit().await?;
        Ok(BookDto::from(book))
    }
}

impl<T> UpdateBookService for T where T: AvailabilityTracker {}

#[async_trait::async_trait]
pub trait DeleteBookService:
    'static + Sync + Send + DependOnBookQuery + DependOnBorrowQuery + DependOnBookModifier
{
    async fn delete_book(&self, dto: DeleteBookDto) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let id = BookId::new(dto.id);
        self.book_query()
            .find_by_id_for_update(&mut connection, &id)
            .await?
            .ok_or_else(|| Report::new(KernelError::NotFound(EntityKind::Book)))?;

        let active = self
            .borrow_query()
            .count_active_by_book(&mut connection, &id)
            .await?;
        if active > 0 {
            return Err(Report::new(KernelError::Conflict(ConflictKind::BookOnLoan)));
        }

        self.book_modifier().delete(&mut connection, &id).await?;
        connection.commit().await?;
        Ok(())
    }
}

impl<T> DeleteBookService for T where
    T: DependOnBookQuery + DependOnBorrowQuery + DependOnBookModifier
{
}

#[cfg(test)]
mod test {
    use driver::database::InMemoryDatabase;
    use kernel::prelude::entity::UserRole;
    use kernel::{ConflictKind, EntityKind, KernelError};
    use time::macros::datetime;
    use uuid::Uuid;

    use crate::service::test_support;
    use crate::service::{
        CreateBookService, CreateBorrowService, DeleteBookService, GetBookService,
        GetBorrowService, UpdateBookService, UpdateBorrowService,
    };
    use crate::transfer::{
        CreateBookDto, CreateBorrowDto, DeleteBookDto, GetBookDto, GetBooksDto, GetBorrowDto,
        UpdateBookDto, UpdateBorrowDto,
    };

    fn create_dto(isbn: &str, total_copies: i32) -> CreateBookDto {
        CreateBookDto {
            title: "The Dispossessed".to_string(),
            author: "Ursula K. Le Guin".to_string(),
            genre: "Science Fiction".to_string(),
            isbn: isbn.to_string(),
            total_copies,
        }
    }

    #[tokio::test]
    async fn create_validates_and_derives_availability() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let book = db.create_book(create_dto("9780061054884", 2)).await?;
        assert!(book.available);
        assert_eq!(db.get_book(GetBookDto { id: book.id }).await?, Some(book));

        let none = db.create_book(create_dto("9780061054885", 0)).await?;
        assert!(!none.available);

        for dto in [
            create_dto("978006105488", 1),
            create_dto("9780061054886", -1),
            CreateBookDto {
                title: String::new(),
                ..create_dto("9780061054887", 1)
            },
            CreateBookDto {
                genre: "g".repeat(101),
                ..create_dto("9780061054888", 1)
            },
        ] {
            let error = db.create_book(dto).await.expect_err("invalid book");
            assert_eq!(error.current_context(), &KernelError::InvalidInput);
        }

        let error = db
            .create_book(create_dto("9780061054884", 1))
            .await
            .expect_err("duplicate isbn");
        assert_eq!(
            error.current_context(),
            &KernelError::Conflict(ConflictKind::IsbnTaken)
        );
        Ok(())
    }

    #[tokio::test]
    async fn list_pages_in_title_order() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        for (title, isbn) in [("Cyteen", "9780000000003"), ("Anathem", "9780000000001")] {
            db.create_book(CreateBookDto {
                title: title.to_string(),
                ..create_dto(isbn, 1)
            })
            .await?;
        }
        let titles = db
            .get_books(GetBooksDto::default())
            .await?
            .into_iter()
            .map(|book| book.title)
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["Anathem".to_string(), "Cyteen".to_string()]);

        let page = db
            .get_books(GetBooksDto {
                limit: Some(1),
                offset: Some(1),
            })
            .await?;
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "Cyteen");
        Ok(())
    }

    #[tokio::test]
    async fn update_recomputes_availability() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let book = db.create_book(create_dto("9780061054884", 2)).await?;
        let member = test_support::user(&db, "member", UserRole::Member).await?;
        db.create_borrow(CreateBorrowDto {
            borrower_id: member.id,
            book_id: book.id,
            now: datetime!(2024-06-03 10:00 UTC),
        })
        .await?;

        let shrunk = db
            .update_book(UpdateBookDto {
                id: book.id,
                title: Some("The Dispossessed: An Ambiguous Utopia".to_string()),
                total_copies: Some(1),
                ..Default::default()
            })
            .await?;
        assert_eq!(shrunk.title, "The Dispossessed: An Ambiguous Utopia");
        assert_eq!(shrunk.total_copies, 1);
        assert!(!shrunk.available);
        assert_eq!(db.get_book(GetBookDto { id: book.id }).await?, Some(shrunk));

        let error = db
            .update_book(UpdateBookDto {
                id: book.id,
                total_copies: Some(0),
                ..Default::default()
            })
            .await
            .expect_err("a copy is out on loan");
        assert_eq!(
            error.current_context(),
            &KernelError::Conflict(ConflictKind::BookOnLoan)
        );
        Ok(())
    }

    #[tokio::test]
    async fn update_rejects_taken_isbn_and_unknown_book() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let first = db.create_book(create_dto("9780061054884", 1)).await?;
        let second = db.create_book(create_dto("9780061054885", 1)).await?;

        let error = db
            .update_book(UpdateBookDto {
                id: second.id,
                isbn: Some(first.isbn.clone()),
                ..Default::default()
            })
            .await
            .expect_err("isbn belongs to another book");
        assert_eq!(
            error.current_context(),
            &KernelError::Conflict(ConflictKind::IsbnTaken)
        );

        // Keeping its own isbn is fine.
        db.update_book(UpdateBookDto {
            id: first.id,
            isbn: Some(first.isbn.clone()),
            ..Default::default()
        })
        .await?;

        let error = db
            .update_book(UpdateBookDto {
                id: Uuid::new_v4(),
                title: Some("Missing".to_string()),
                ..Default::default()
            })
            .await
            .expect_err("unknown book");
        assert_eq!(
            error.current_context(),
            &KernelError::NotFound(EntityKind::Book)
        );
        Ok(())
    }

    #[tokio::test]
    async fn delete_refuses_books_on_loan() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let book = db.create_book(create_dto("9780061054884", 1)).await?;
        let member = test_support::user(&db, "member", UserRole::Member).await?;
        let borrow = db
            .create_borrow(CreateBorrowDto {
                borrower_id: member.id,
                book_id: book.id,
                now: datetime!(2024-06-03 10:00 UTC),
            })
            .await?;

        let error = db
            .delete_book(DeleteBookDto { id: book.id })
            .await
            .expect_err("copy is on loan");
        assert_eq!(
            error.current_context(),
            &KernelError::Conflict(ConflictKind::BookOnLoan)
        );

        db.update_borrow(UpdateBorrowDto {
            id: borrow.id,
            returned: Some(true),
            ..Default::default()
        })
        .await?;
        db.delete_book(DeleteBookDto { id: book.id }).await?;
        assert!(db.get_book(GetBookDto { id: book.id }).await?.is_none());
        assert!(db.get_borrow(GetBorrowDto { id: borrow.id }).await?.is_none());

        let error = db
            .delete_book(DeleteBookDto { id: book.id })
            .await
            .expect_err("already deleted");
        assert_eq!(
            error.current_context(),
            &KernelError::NotFound(EntityKind::Book)
        );
        Ok(())
    }
}
