use vodca::{AsRefln, Fromln};

use crate::entity::common::validate_length;
use crate::KernelError;

#[derive(Debug, Clone, Eq, PartialEq, Fromln, AsRefln)]
pub struct BookAuthor(String);

impl BookAuthor {
    pub fn new(author: impl Into<String>) -> Self {
        Self(author.into())
    }

    pub fn try_new(author: impl Into<String>) -> error_stack::Result<Self, KernelError> {
        let author = author.into();
        validate_length("author", &author, 1, 255)?;
        Ok(Self(author))
    }
}
