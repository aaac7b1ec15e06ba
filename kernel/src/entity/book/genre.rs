use vodca::{AsRefln, Fromln};

use crate::entity::common::validate_length;
use crate::KernelError;

#[derive(Debug, Clone, Eq, PartialEq, Fromln, AsRefln)]
pub struct BookGenre(String);

impl BookGenre {
    pub fn new(genre: impl Into<String>) -> Self {
        Self(genre.into())
    }

    pub fn try_new(genre: impl Into<String>) -> error_stack::Result<Self, KernelError> {
        let genre = genre.into();
        validate_length("genre", &genre, 1, 100)?;
        Ok(Self(genre))
    }
}
