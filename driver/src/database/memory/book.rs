use kernel::interface::query::{BookQuery, DependOnBookQuery};
use kernel::interface::update::{BookModifier, DependOnBookModifier};
use kernel::prelude::entity::{Book, BookAvailable, BookId, BookIsbn, SelectLimit, SelectOffset};
use kernel::{ConflictKind, KernelError};

use crate::database::memory::{conflict, dangling, InMemoryDatabase, InMemoryTransaction};

pub struct InMemoryBookRepository;

#[async_trait::async_trait]
impl BookQuery for InMemoryBookRepository {
    type Transaction = InMemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        Ok(con.tables().books.get(id).cloned())
    }

    async fn find_by_id_for_update(
        &self,
        con: &mut InMemoryTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        // Already exclusive for the whole transaction.
        self.find_by_id(con, id).await
    }

    async fn find_by_isbn(
        &self,
        con: &mut InMemoryTransaction,
        isbn: &BookIsbn,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        Ok(con
            .tables()
            .books
            .values()
            .find(|book| book.isbn() == isbn)
            .cloned())
    }

    async fn find_all(
        &self,
        con: &mut InMemoryTransaction,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let mut books = con.tables().books.values().collect::<Vec<_>>();
        books.sort_by(|a, b| {
            a.title()
                .as_ref()
                .cmp(b.title().as_ref())
                .then_with(|| a.id().as_ref().cmp(b.id().as_ref()))
        });
        let offset = usize::try_from(*offset.as_ref()).unwrap_or(0);
        let limit = usize::try_from(*limit.as_ref()).unwrap_or(0);
        Ok(books
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, con: &mut InMemoryTransaction) -> error_stack::Result<i64, KernelError> {
        Ok(con.tables().books.len() as i64)
    }
}

#[async_trait::async_trait]
impl BookModifier for InMemoryBookRepository {
    type Transaction = InMemoryTransaction;

    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        let tables = con.tables_mut()?;
        if tables.books.contains_key(book.id()) {
            return Err(dangling("book id already exists"));
        }
        if tables.books.values().any(|other| other.isbn() == book.isbn()) {
            return Err(conflict(ConflictKind::IsbnTaken));
        }
        tables.books.insert(book.id().clone(), book.clone());
        Ok(())
    }

    async fn update(
        &self,
        con: &mut InMemoryTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        let tables = con.tables_mut()?;
        if tables
            .books
            .values()
            .any(|other| other.id() != book.id() && other.isbn() == book.isbn())
        {
            return Err(conflict(ConflictKind::IsbnTaken));
        }
        let stored = tables
            .books
            .get_mut(book.id())
            .ok_or_else(|| dangling("update of a missing book"))?;
        let available = *stored.available();
        *stored = book.clone();
        stored.substitute(|stored| *stored.available = available);
        Ok(())
    }

    async fn update_availability(
        &self,
        con: &mut InMemoryTransaction,
        book_id: &BookId,
        available: &BookAvailable,
    ) -> error_stack::Result<(), KernelError> {
        con.tables_mut()?
            .books
            .get_mut(book_id)
            .ok_or_else(|| dangling("availability of a missing book"))?
            .substitute(|stored| *stored.available = *available);
        Ok(())
    }

    async fn delete(
        &self,
        con: &mut InMemoryTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<(), KernelError> {
        let tables = con.tables_mut()?;
        tables
            .borrows
            .retain(|_, borrow| borrow.book_id() != book_id || borrow.is_active());
        if tables
            .borrows
            .values()
            .any(|borrow| borrow.book_id() == book_id)
        {
            return Err(dangling("book is still referenced by an active borrow"));
        }
        tables.books.remove(book_id);
        Ok(())
    }
}

impl DependOnBookQuery for InMemoryDatabase {
    type BookQuery = InMemoryBookRepository;
    fn book_query(&self) -> &Self::BookQuery {
        &InMemoryBookRepository
    }
}

impl DependOnBookModifier for InMemoryDatabase {
    type BookModifier = InMemoryBookRepository;
    fn book_modifier(&self) -> &Self::BookModifier {
        &InMemoryBookRepository
    }
}

#[cfg(test)]
mod test {
    use kernel::interface::database::{DatabaseConnection, Transaction};
    use kernel::interface::query::BookQuery;
    use kernel::interface::update::BookModifier;
    use kernel::prelude::entity::{BookAvailable, BookTitle, SelectLimit, SelectOffset};
    use kernel::{ConflictKind, KernelError};

    use crate::database::memory::test::book;
    use crate::database::memory::{InMemoryBookRepository, InMemoryDatabase};

    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let mut con = db.transact().await?;

        let mut dune = book("9780441013593", 2);
        InMemoryBookRepository.create(&mut con, &dune).await?;
        let found = InMemoryBookRepository
            .find_by_isbn(&mut con, dune.isbn())
            .await?;
        assert_eq!(found, Some(dune.clone()));

        dune.substitute(|b| *b.title = BookTitle::new("Dune Messiah"));
        dune.substitute(|b| *b.available = BookAvailable::new(false));
        InMemoryBookRepository.update(&mut con, &dune).await?;
        let found = InMemoryBookRepository
            .find_by_id(&mut con, dune.id())
            .await?
            .map(|b| (b.title().clone(), *b.available()));
        assert_eq!(
            found,
            Some((BookTitle::new("Dune Messiah"), BookAvailable::new(true)))
        );

        InMemoryBookRepository
            .update_availability(&mut con, dune.id(), &BookAvailable::new(false))
            .await?;
        let found = InMemoryBookRepository.find_by_id(&mut con, dune.id()).await?;
        assert_eq!(found.map(|b| *b.available()), Some(BookAvailable::new(false)));

        InMemoryBookRepository.delete(&mut con, dune.id()).await?;
        assert_eq!(InMemoryBookRepository.count(&mut con).await?, 0);
        con.commit().await?;
        Ok(())
    }

    #[tokio::test]
    async fn isbn_is_unique() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let mut con = db.transact().await?;
        InMemoryBookRepository
            .create(&mut con, &book("9780441013593", 1))
            .await?;
        let error = InMemoryBookRepository
            .create(&mut con, &book("9780441013593", 1))
            .await
            .expect_err("isbn must be unique");
        assert_eq!(
            error.current_context(),
            &KernelError::Conflict(ConflictKind::IsbnTaken)
        );
        Ok(())
    }

    #[tokio::test]
    async fn lists_by_title_with_paging() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let mut con = db.transact().await?;
        for (title, isbn) in [
            ("C", "9780000000003"),
            ("A", "9780000000001"),
            ("B", "9780000000002"),
        ] {
            let mut book = book(isbn, 1);
            book.substitute(|b| *b.title = BookTitle::new(title));
            InMemoryBookRepository.create(&mut con, &book).await?;
        }

        let titles = InMemoryBookRepository
            .find_all(&mut con, &SelectLimit::new(2), &SelectOffset::new(1))
            .await?
            .into_iter()
            .map(|b| b.title().as_ref().to_string())
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["B".to_string(), "C".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn updating_a_missing_book_fails() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let mut con = db.transact().await?;
        let ghost = book("9780441013593", 1);

        let error = InMemoryBookRepository
            .update(&mut con, &ghost)
            .await
            .expect_err("nothing to update");
        assert_eq!(error.current_context(), &KernelError::Internal);
        let error = InMemoryBookRepository
            .update_availability(&mut con, ghost.id(), &BookAvailable::new(false))
            .await
            .expect_err("nothing to update");
        assert_eq!(error.current_context(), &KernelError::Internal);
        assert_eq!(InMemoryBookRepository.count(&mut con).await?, 0);
        Ok(())
    }
}
