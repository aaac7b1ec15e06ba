use time::Duration;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{
    BookQuery, BorrowQuery, DependOnBookQuery, DependOnBorrowQuery, DependOnReportQuery,
    DestructOverdueLoan, ReportQuery,
};
use kernel::prelude::entity::{start_of_day, DestructBook, DestructBorrow, DestructUser, UserId, UserRole};
use kernel::KernelError;

use crate::transfer::{
    BorrowSummaryDto, DashboardDto, DashboardReportDto, DashboardSummaryDto, LibrarianReportDto,
    MemberReportDto, OverdueMemberDto,
};

#[async_trait::async_trait]
pub trait MemberReportService: 'static + Sync + Send + DependOnReportQuery {
    /// Active borrows of one member with the days left until each falls due.
    async fn member_report(
        &self,
        dto: MemberReportDto,
    ) -> error_stack::Result<Vec<BorrowSummaryDto>, KernelError> {
        let mut connection = self.database_connection().snapshot().await?;
        let user_id = UserId::new(dto.user_id);
        let loans = self
            .report_query()
            .find_loans_by_borrower(&mut connection, &user_id)
            .await?;
        connection.commit().await?;

        Ok(loans
            .into_iter()
            .map(|loan| BorrowSummaryDto::summarize(loan, &dto.now))
            .collect())
    }
}

impl<T> MemberReportService for T where T: DependOnReportQuery {}

#[async_trait::async_trait]
pub trait LibrarianReportService:
    'static + Sync + Send + DependOnBookQuery + DependOnBorrowQuery + DependOnReportQuery
{
    /// Library-wide counters and the list of overdue borrows, read from one snapshot.
    async fn librarian_report(
        &self,
        dto: LibrarianReportDto,
    ) -> error_stack::Result<DashboardSummaryDto, KernelError> {
        let today = start_of_day(&dto.now);
        let tomorrow = today + Duration::days(1);

        let mut connection = self.database_connection().snapshot().await?;
        let total_books = self.book_query().count(&mut connection).await?;
        let total_borrowed_books = self.borrow_query().count_active(&mut connection).await?;
        let books_due_today = self
            .borrow_query()
            .count_active_due_between(&mut connection, &today, &tomorrow)
            .await?;
        let overdue = self
            .report_query()
            .find_overdue_loans(&mut connection, &today)
            .await?;
        connection.commit().await?;

        let overdue_members = overdue
            .into_iter()
            .map(|loan| {
                let DestructOverdueLoan {
                    borrow,
                    book,
                    borrower,
                } = loan.into_destruct();
                let days_overdue = borrow.days_overdue(&dto.now);
                let DestructBorrow {
                    borrowed_at,
                    due_at,
                    ..
                } = borrow.into_destruct();
                let DestructBook { title, author, .. } = book.into_destruct();
                let DestructUser {
                    id, name, email, ..
                } = borrower.into_destruct();
                OverdueMemberDto {
                    member_id: id.into(),
                    member_name: name.into(),
                    member_email: email.into(),
                    book_title: title.into(),
                    book_author: author.into(),
                    borrowed_at: borrowed_at.into(),
                    due_at: due_at.into(),
                    days_overdue,
                }
            })
            .collect();

        Ok(DashboardSummaryDto {
            total_books,
            total_borrowed_books,
            books_due_today,
            overdue_members,
        })
    }
}

impl<T> LibrarianReportService for T where
    T: DependOnBookQuery + DependOnBorrowQuery + DependOnReportQuery
{
}

#[async_trait::async_trait]
pub trait DashboardService: 'static + Sync + Send + MemberReportService + LibrarianReportService {
    /// Librarians see the library-wide summary, members see their own borrows.
    async fn dashboard(
        &self,
        dto: DashboardDto,
    ) -> error_stack::Result<DashboardReportDto, KernelError> {
        match dto.actor.role() {
            UserRole::Librarian => {
                let summary = self
                    .librarian_report(LibrarianReportDto { now: dto.now })
                    .await?;
                Ok(DashboardReportDto::Librarian(summary))
            }
            UserRole::Member => {
                let borrowed_books = self
                    .member_report(MemberReportDto {
                        user_id: *dto.actor.id().as_ref(),
                        now: dto.now,
                    })
                    .await?;
                Ok(DashboardReportDto::Member { borrowed_books })
            }
        }
    }
}

impl<T> DashboardService for T where T: MemberReportService + LibrarianReportService {}
