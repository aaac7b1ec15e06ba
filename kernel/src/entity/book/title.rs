use vodca::{AsRefln, Fromln};

use crate::entity::common::validate_length;
use crate::KernelError;

#[derive(Debug, Clone, Eq, PartialEq, Fromln, AsRefln)]
pub struct BookTitle(String);

impl BookTitle {
    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    pub fn try_new(title: impl Into<String>) -> error_stack::Result<Self, KernelError> {
        let title = title.into();
        validate_length("title", &title, 1, 255)?;
        Ok(Self(title))
    }
}
