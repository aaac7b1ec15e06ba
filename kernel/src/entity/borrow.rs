mod borrowed_at;
mod due_at;
mod id;
mod returned;

pub use self::{borrowed_at::*, due_at::*, id::*, returned::*};
use destructure::Destructure;
use time::{Duration, OffsetDateTime};
use vodca::References;

use crate::entity::{calendar_days_between, start_of_day, BookId, UserId};

/// How long a copy may be kept before it falls due.
pub const LOAN_PERIOD: Duration = Duration::days(14);

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct Borrow {
    id: BorrowId,
    borrower_id: UserId,
    book_id: BookId,
    borrowed_at: BorrowedAt,
    due_at: DueAt,
    returned: Returned,
}

impl Borrow {
    pub fn new(
        id: BorrowId,
        borrower_id: UserId,
        book_id: BookId,
        borrowed_at: BorrowedAt,
        due_at: DueAt,
        returned: Returned,
    ) -> Self {
        Self {
            id,
            borrower_id,
            book_id,
            borrowed_at,
            due_at,
            returned,
        }
    }

    /// Starts a new loan at `now`, due one [`LOAN_PERIOD`] later.
    pub fn open(borrower_id: UserId, book_id: BookId, now: OffsetDateTime) -> Self {
        Self::new(
            BorrowId::default(),
            borrower_id,
            book_id,
            BorrowedAt::new(now),
            DueAt::new(now + LOAN_PERIOD),
            Returned::new(false),
        )
    }

    pub fn is_active(&self) -> bool {
        !self.returned.as_ref()
    }

    /// Marks the borrow returned. Returns `true` only on the active to returned transition.
    pub fn mark_returned(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.returned = Returned::new(true);
        true
    }

    pub fn reschedule(&mut self, due_at: DueAt) {
        self.due_at = due_at;
    }

    /// An active borrow is overdue once its due date is strictly before today.
    pub fn is_overdue(&self, now: &OffsetDateTime) -> bool {
        self.is_active() && *self.due_at.as_ref() < start_of_day(now)
    }

    pub fn days_until_due(&self, now: &OffsetDateTime) -> i64 {
        calendar_days_between(now, self.due_at.as_ref())
    }

    pub fn days_overdue(&self, now: &OffsetDateTime) -> i64 {
        calendar_days_between(self.due_at.as_ref(), now)
    }
}

#[cfg(test)]
mod test {
    use time::macros::datetime;
    use time::Duration;

    use super::{Borrow, LOAN_PERIOD};
    use crate::entity::{BookId, UserId};

    fn open_at(now: time::OffsetDateTime) -> Borrow {
        Borrow::open(
            UserId::new(uuid::Uuid::new_v4()),
            BookId::new(uuid::Uuid::new_v4()),
            now,
        )
    }

    #[test]
    fn open_is_due_after_loan_period() {
        let now = datetime!(2024-05-01 10:00 UTC);
        let borrow = open_at(now);
        assert!(borrow.is_active());
        assert_eq!(borrow.borrowed_at().as_ref(), &now);
        assert_eq!(borrow.due_at().as_ref(), &(now + LOAN_PERIOD));
        assert_eq!(borrow.days_until_due(&now), 14);
    }

    #[test]
    fn mark_returned_transitions_once() {
        let mut borrow = open_at(datetime!(2024-05-01 10:00 UTC));
        assert!(borrow.mark_returned());
        assert!(!borrow.is_active());
        assert!(!borrow.mark_returned());
        assert!(!borrow.is_active());
    }

    #[test]
    fn overdue_uses_calendar_days() {
        let borrowed = datetime!(2024-05-01 10:00 UTC);
        let borrow = open_at(borrowed);
        let due_day = borrowed + LOAN_PERIOD;
        assert!(!borrow.is_overdue(&due_day));
        assert!(!borrow.is_overdue(&(due_day + Duration::hours(13))));

        let next_day = due_day + Duration::days(1);
        assert!(borrow.is_overdue(&next_day));
        assert_eq!(borrow.days_overdue(&next_day), 1);
        assert_eq!(borrow.days_until_due(&next_day), -1);
    }

    #[test]
    fn returned_borrow_is_never_overdue() {
        let borrowed = datetime!(2024-05-01 10:00 UTC);
        let mut borrow = open_at(borrowed);
        borrow.mark_returned();
        assert!(!borrow.is_overdue(&(borrowed + Duration::days(60))));
    }
}
