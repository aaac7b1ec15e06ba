use error_stack::Report;
use vodca::{AsRefln, Fromln};

use crate::KernelError;

const ISBN_LENGTH: usize = 13;

#[derive(Debug, Clone, Hash, Eq, PartialEq, Fromln, AsRefln)]
pub struct BookIsbn(String);

impl BookIsbn {
    pub fn new(isbn: impl Into<String>) -> Self {
        Self(isbn.into())
    }

    pub fn try_new(isbn: impl Into<String>) -> error_stack::Result<Self, KernelError> {
        let isbn = isbn.into();
        let length = isbn.chars().count();
        if length != ISBN_LENGTH {
            return Err(Report::new(KernelError::InvalidInput).attach_printable(format!(
                "isbn is the wrong length (should be {ISBN_LENGTH} characters, got {length})"
            )));
        }
        Ok(Self(isbn))
    }
}

#[cfg(test)]
mod test {
    use super::BookIsbn;
    use crate::KernelError;

    #[test]
    fn requires_exactly_thirteen_characters() {
        assert!(BookIsbn::try_new("9780134685991").is_ok());
        for isbn in ["978013468599", "97801346859911", ""] {
            let error = BookIsbn::try_new(isbn).unwrap_err();
            assert_eq!(error.current_context(), &KernelError::InvalidInput);
        }
    }
}
