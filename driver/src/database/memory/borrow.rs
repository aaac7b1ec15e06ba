use time::OffsetDateTime;

use kernel::interface::query::{BorrowQuery, DependOnBorrowQuery};
use kernel::interface::update::{BorrowModifier, DependOnBorrowModifier};
use kernel::prelude::entity::{BookId, Borrow, BorrowId, UserId};
use kernel::{ConflictKind, KernelError};

use crate::database::memory::{conflict, dangling, InMemoryDatabase, InMemoryTransaction};

pub struct InMemoryBorrowRepository;

#[async_trait::async_trait]
impl BorrowQuery for InMemoryBorrowRepository {
    type Transaction = InMemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &BorrowId,
    ) -> error_stack::Result<Option<Borrow>, KernelError> {
        Ok(con.tables().borrows.get(id).cloned())
    }

    async fn find_by_id_for_update(
        &self,
        con: &mut InMemoryTransaction,
        id: &BorrowId,
    ) -> error_stack::Result<Option<Borrow>, KernelError> {
        self.find_by_id(con, id).await
    }

    async fn find_active(
        &self,
        con: &mut InMemoryTransaction,
        borrower_id: &UserId,
        book_id: &BookId,
    ) -> error_stack::Result<Option<Borrow>, KernelError> {
        Ok(con
            .tables()
            .borrows
            .values()
            .find(|borrow| {
                borrow.is_active()
                    && borrow.borrower_id() == borrower_id
                    && borrow.book_id() == book_id
            })
            .cloned())
    }

    async fn count_active_by_book(
        &self,
        con: &mut InMemoryTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<i64, KernelError> {
        Ok(con
            .tables()
            .borrows
            .values()
            .filter(|borrow| borrow.is_active() && borrow.book_id() == book_id)
            .count() as i64)
    }

    async fn count_active(
        &self,
        con: &mut InMemoryTransaction,
    ) -> error_stack::Result<i64, KernelError> {
        Ok(con
            .tables()
            .borrows
            .values()
            .filter(|borrow| borrow.is_active())
            .count() as i64)
    }

    async fn count_active_due_between(
        &self,
        con: &mut InMemoryTransaction,
        from: &OffsetDateTime,
        until: &OffsetDateTime,
    ) -> error_stack::Result<i64, KernelError> {
        Ok(con
            .tables()
            .borrows
            .values()
            .filter(|borrow| {
                let due_at = borrow.due_at().as_ref();
                borrow.is_active() && from <= due_at && due_at < until
            })
            .count() as i64)
    }
}

#[async_trait::async_trait]
impl BorrowModifier for InMemoryBorrowRepository {
    type Transaction = InMemoryTransaction;

    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        borrow: &Borrow,
    ) -> error_stack::Result<(), KernelError> {
        let tables = con.tables_mut()?;
        if !tables.books.contains_key(borrow.book_id()) {
            return Err(dangling("borrow refers to a missing book"));
        }
        if !tables.users.contains_key(borrow.borrower_id()) {
            return Err(dangling("borrow refers to a missing user"));
        }
        if tables.borrows.contains_key(borrow.id()) {
            return Err(dangling("borrow id already exists"));
        }
        let duplicate = borrow.is_active()
            && tables.borrows.values().any(|other| {
                other.is_active()
                    && other.borrower_id() == borrow.borrower_id()
                    && other.book_id() == borrow.book_id()
            });
        if duplicate {
            return Err(conflict(ConflictKind::AlreadyBorrowed));
        }
        tables.borrows.insert(borrow.id().clone(), borrow.clone());
        Ok(())
    }

    async fn update(
        &self,
        con: &mut InMemoryTransaction,
        borrow: &Borrow,
    ) -> error_stack::Result<(), KernelError> {
        let stored = con
            .tables_mut()?
            .borrows
            .get_mut(borrow.id())
            .ok_or_else(|| dangling("update of a missing borrow"))?;
        stored.reschedule(borrow.due_at().clone());
        if !borrow.is_active() {
            stored.mark_returned();
        }
        Ok(())
    }
}

impl DependOnBorrowQuery for InMemoryDatabase {
    type BorrowQuery = InMemoryBorrowRepository;
    fn borrow_query(&self) -> &Self::BorrowQuery {
        &InMemoryBorrowRepository
    }
}

impl DependOnBorrowModifier for InMemoryDatabase {
    type BorrowModifier = InMemoryBorrowRepository;
    fn borrow_modifier(&self) -> &Self::BorrowModifier {
        &InMemoryBorrowRepository
    }
}

#[cfg(test)]
mod test {
    use time::macros::datetime;
    use time::Duration;

    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::BorrowQuery;
    use kernel::interface::update::{BookModifier, BorrowModifier, UserModifier};
    use kernel::prelude::entity::{Borrow, UserRole};
    use kernel::{ConflictKind, KernelError};

    use crate::database::memory::test::{book, user};
    use crate::database::memory::{
        InMemoryBookRepository, InMemoryBorrowRepository, InMemoryDatabase,
        InMemoryUserRepository,
    };

    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let mut con = db.transact().await?;
        let book = book("9780441013593", 2);
        let user = user("member@example.com", UserRole::Member);
        InMemoryBookRepository.create(&mut con, &book).await?;
        InMemoryUserRepository.create(&mut con, &user).await?;

        let now = datetime!(2024-03-10 12:00 UTC);
        let mut borrow = Borrow::open(user.id().clone(), book.id().clone(), now);
        InMemoryBorrowRepository.create(&mut con, &borrow).await?;

        let found = InMemoryBorrowRepository
            .find_active(&mut con, user.id(), book.id())
            .await?;
        assert_eq!(found, Some(borrow.clone()));
        assert_eq!(
            InMemoryBorrowRepository
                .count_active_by_book(&mut con, book.id())
                .await?,
            1
        );
        let due_day = datetime!(2024-03-24 0:00 UTC);
        assert_eq!(
            InMemoryBorrowRepository
                .count_active_due_between(&mut con, &due_day, &(due_day + Duration::days(1)))
                .await?,
            1
        );

        borrow.mark_returned();
        InMemoryBorrowRepository.update(&mut con, &borrow).await?;
        let found = InMemoryBorrowRepository
            .find_by_id(&mut con, borrow.id())
            .await?;
        assert_eq!(found, Some(borrow));
        assert_eq!(InMemoryBorrowRepository.count_active(&mut con).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn second_active_borrow_is_a_conflict() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let mut con = db.transact().await?;
        let book = book("9780441013593", 2);
        let user = user("member@example.com", UserRole::Member);
        InMemoryBookRepository.create(&mut con, &book).await?;
        InMemoryUserRepository.create(&mut con, &user).await?;

        let now = datetime!(2024-03-10 12:00 UTC);
        InMemoryBorrowRepository
            .create(
                &mut con,
                &Borrow::open(user.id().clone(), book.id().clone(), now),
            )
            .await?;
        let error = InMemoryBorrowRepository
            .create(
                &mut con,
                &Borrow::open(user.id().clone(), book.id().clone(), now),
            )
            .await
            .expect_err("only one active borrow per borrower and book");
        assert_eq!(
            error.current_context(),
            &KernelError::Conflict(ConflictKind::AlreadyBorrowed)
        );
        Ok(())
    }

    #[tokio::test]
    async fn updating_a_missing_borrow_fails() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let mut con = db.transact().await?;
        let book = book("9780441013593", 1);
        let user = user("member@example.com", UserRole::Member);
        let borrow = Borrow::open(
            user.id().clone(),
            book.id().clone(),
            datetime!(2024-03-10 12:00 UTC),
        );
        let error = InMemoryBorrowRepository
            .update(&mut con, &borrow)
            .await
            .expect_err("nothing to update");
        assert_eq!(error.current_context(), &KernelError::Internal);
        assert_eq!(InMemoryBorrowRepository.count_active(&mut con).await?, 0);
        Ok(())
    }
}
