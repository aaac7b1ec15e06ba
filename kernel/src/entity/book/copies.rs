use error_stack::Report;
use vodca::{AsRefln, Fromln};

use crate::KernelError;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Fromln, AsRefln)]
pub struct BookTotalCopies(i32);

impl BookTotalCopies {
    pub fn new(copies: impl Into<i32>) -> Self {
        Self(copies.into())
    }

    pub fn try_new(copies: impl Into<i32>) -> error_stack::Result<Self, KernelError> {
        let copies = copies.into();
        if copies < 0 {
            return Err(Report::new(KernelError::InvalidInput)
                .attach_printable("total_copies must be greater than or equal to 0"));
        }
        Ok(Self(copies))
    }

    /// Whether `active_borrows` concurrent borrows fit within the copy count.
    pub fn can_cover(&self, active_borrows: i64) -> bool {
        active_borrows <= i64::from(self.0)
    }
}
