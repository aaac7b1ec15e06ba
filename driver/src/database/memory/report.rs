use time::OffsetDateTime;

use kernel::interface::query::{DependOnReportQuery, LoanedBook, OverdueLoan, ReportQuery};
use kernel::prelude::entity::UserId;
use kernel::KernelError;

use crate::database::memory::{dangling, InMemoryDatabase, InMemoryTransaction};

pub struct InMemoryReportRepository;

#[async_trait::async_trait]
impl ReportQuery for InMemoryReportRepository {
    type Transaction = InMemoryTransaction;

    async fn find_loans_by_borrower(
        &self,
        con: &mut InMemoryTransaction,
        borrower_id: &UserId,
    ) -> error_stack::Result<Vec<LoanedBook>, KernelError> {
        let tables = con.tables();
        let mut borrows = tables
            .borrows
            .values()
            .filter(|borrow| borrow.is_active() && borrow.borrower_id() == borrower_id)
            .collect::<Vec<_>>();
        borrows.sort_by(|a, b| {
            a.due_at()
                .as_ref()
                .cmp(b.due_at().as_ref())
                .then_with(|| a.id().as_ref().cmp(b.id().as_ref()))
        });
        borrows
            .into_iter()
            .map(|borrow| -> error_stack::Result<LoanedBook, KernelError> {
                let book = tables
                    .books
                    .get(borrow.book_id())
                    .ok_or_else(|| dangling("borrow refers to a missing book"))?;
                Ok(LoanedBook::new(borrow.clone(), book.clone()))
            })
            .collect()
    }

    async fn find_overdue_loans(
        &self,
        con: &mut InMemoryTransaction,
        before: &OffsetDateTime,
    ) -> error_stack::Result<Vec<OverdueLoan>, KernelError> {
        let tables = con.tables();
        let mut borrows = tables
            .borrows
            .values()
            .filter(|borrow| borrow.is_active() && borrow.due_at().as_ref() < before)
            .collect::<Vec<_>>();
        borrows.sort_by(|a, b| {
            a.due_at()
                .as_ref()
                .cmp(b.due_at().as_ref())
                .then_with(|| a.id().as_ref().cmp(b.id().as_ref()))
        });
        borrows
            .into_iter()
            .map(|borrow| -> error_stack::Result<OverdueLoan, KernelError> {
                let book = tables
                    .books
                    .get(borrow.book_id())
                    .ok_or_else(|| dangling("borrow refers to a missing book"))?;
                let borrower = tables
                    .users
                    .get(borrow.borrower_id())
                    .ok_or_else(|| dangling("borrow refers to a missing user"))?;
                Ok(OverdueLoan::new(
                    borrow.clone(),
                    book.clone(),
                    borrower.clone(),
                ))
            })
            .collect()
    }
}

impl DependOnReportQuery for InMemoryDatabase {
    type ReportQuery = InMemoryReportRepository;
    fn report_query(&self) -> &Self::ReportQuery {
        &InMemoryReportRepository
    }
}

#[cfg(test)]
mod test {
    use time::macros::datetime;

    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::ReportQuery;
    use kernel::interface::update::{BookModifier, BorrowModifier, UserModifier};
    use kernel::prelude::entity::{Borrow, UserRole};
    use kernel::KernelError;

    use crate::database::memory::test::{book, user};
    use crate::database::memory::{
        InMemoryBookRepository, InMemoryBorrowRepository, InMemoryDatabase,
        InMemoryReportRepository, InMemoryUserRepository,
    };

    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let mut con = db.transact().await?;
        let dune = book("9780441013593", 1);
        let emma = book("9780141439587", 1);
        let member = user("member@example.com", UserRole::Member);
        InMemoryBookRepository.create(&mut con, &dune).await?;
        InMemoryBookRepository.create(&mut con, &emma).await?;
        InMemoryUserRepository.create(&mut con, &member).await?;

        let late = Borrow::open(
            member.id().clone(),
            dune.id().clone(),
            datetime!(2024-01-01 9:00 UTC),
        );
        let mut returned = Borrow::open(
            member.id().clone(),
            emma.id().clone(),
            datetime!(2024-01-02 9:00 UTC),
        );
        returned.mark_returned();
        InMemoryBorrowRepository.create(&mut con, &late).await?;
        InMemoryBorrowRepository.create(&mut con, &returned).await?;

        let loans = InMemoryReportRepository
            .find_loans_by_borrower(&mut con, member.id())
            .await?;
        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].book(), &dune);

        let overdue = InMemoryReportRepository
            .find_overdue_loans(&mut con, &datetime!(2024-02-01 0:00 UTC))
            .await?;
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].borrower(), &member);
        assert_eq!(overdue[0].borrow(), &late);

        let overdue = InMemoryReportRepository
            .find_overdue_loans(&mut con, &datetime!(2024-01-10 0:00 UTC))
            .await?;
        assert!(overdue.is_empty());
        Ok(())
    }
}
