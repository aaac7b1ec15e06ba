use destructure::Destructure;
use time::OffsetDateTime;
use vodca::References;

use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Book, Borrow, User, UserId};
use crate::KernelError;

/// An active borrow joined with the book it refers to.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct LoanedBook {
    borrow: Borrow,
    book: Book,
}

impl LoanedBook {
    pub fn new(borrow: Borrow, book: Book) -> Self {
        Self { borrow, book }
    }
}

/// An overdue borrow joined with its book and borrower.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct OverdueLoan {
    borrow: Borrow,
    book: Book,
    borrower: User,
}

impl OverdueLoan {
    pub fn new(borrow: Borrow, book: Book, borrower: User) -> Self {
        Self {
            borrow,
            book,
            borrower,
        }
    }
}

#[async_trait::async_trait]
pub trait ReportQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_loans_by_borrower(
        &self,
        con: &mut Self::Transaction,
        borrower_id: &UserId,
    ) -> error_stack::Result<Vec<LoanedBook>, KernelError>;
    /// Active borrows with `due_at < before`, oldest due date first.
    async fn find_overdue_loans(
        &self,
        con: &mut Self::Transaction,
        before: &OffsetDateTime,
    ) -> error_stack::Result<Vec<OverdueLoan>, KernelError>;
}

pub trait DependOnReportQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type ReportQuery: ReportQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn report_query(&self) -> &Self::ReportQuery;
}
