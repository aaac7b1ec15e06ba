use vodca::{AsRefln, Fromln};

use crate::entity::BookTotalCopies;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Fromln, AsRefln)]
pub struct BookAvailable(bool);

impl BookAvailable {
    pub fn new(available: impl Into<bool>) -> Self {
        Self(available.into())
    }

    /// A book is available while at least one copy is not lent out.
    pub fn derive(active_borrows: i64, total_copies: &BookTotalCopies) -> Self {
        Self(active_borrows < i64::from(*total_copies.as_ref()))
    }
}
