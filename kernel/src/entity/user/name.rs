use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::entity::common::validate_length;
use crate::KernelError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct UserName(String);

impl UserName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn try_new(name: impl Into<String>) -> error_stack::Result<Self, KernelError> {
        let name = name.into();
        validate_length("name", name.trim(), 1, 255)?;
        Ok(Self(name))
    }
}
