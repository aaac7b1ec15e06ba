use std::fmt::{Display, Formatter};
use std::str::FromStr;

use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::KernelError;

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Member,
    Librarian,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Member => "member",
            UserRole::Librarian => "librarian",
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = Report<KernelError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(UserRole::Member),
            "librarian" => Ok(UserRole::Librarian),
            _ => Err(Report::new(KernelError::InvalidInput)
                .attach_printable(format!("{s} is not a valid role"))),
        }
    }
}
