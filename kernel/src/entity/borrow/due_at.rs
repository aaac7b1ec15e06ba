use error_stack::Report;
use time::OffsetDateTime;
use vodca::{AsRefln, Fromln};

use crate::entity::BorrowedAt;
use crate::KernelError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln)]
pub struct DueAt(OffsetDateTime);

impl DueAt {
    pub fn new(time: impl Into<OffsetDateTime>) -> Self {
        Self(time.into())
    }

    /// A due date may not precede the moment the copy was lent.
    pub fn try_new(
        time: impl Into<OffsetDateTime>,
        borrowed_at: &BorrowedAt,
    ) -> error_stack::Result<Self, KernelError> {
        let time = time.into();
        if time < *borrowed_at.as_ref() {
            return Err(Report::new(KernelError::InvalidInput)
                .attach_printable("due_at must not be earlier than borrowed_at"));
        }
        Ok(Self(time))
    }
}
