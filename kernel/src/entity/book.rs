mod author;
mod available;
mod copies;
mod genre;
mod id;
mod isbn;
mod title;

pub use self::{author::*, available::*, copies::*, genre::*, id::*, isbn::*, title::*};
use destructure::{Destructure, Mutation};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Book {
    id: BookId,
    title: BookTitle,
    author: BookAuthor,
    genre: BookGenre,
    isbn: BookIsbn,
    total_copies: BookTotalCopies,
    available: BookAvailable,
}

impl Book {
    pub fn new(
        id: BookId,
        title: BookTitle,
        author: BookAuthor,
        genre: BookGenre,
        isbn: BookIsbn,
        total_copies: BookTotalCopies,
        available: BookAvailable,
    ) -> Self {
        Self {
            id,
            title,
            author,
            genre,
            isbn,
            total_copies,
            available,
        }
    }
}
