use uuid::Uuid;

use kernel::prelude::entity::{Book, DestructBook};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BookDto {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub isbn: String,
    pub total_copies: i32,
    pub available: bool,
}

impl From<Book> for BookDto {
    fn from(value: Book) -> Self {
        let DestructBook {
            id,
            title,
            author,
            genre,
            isbn,
            total_copies,
            available,
        } = value.into_destruct();
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
            isbn: isbn.into(),
            total_copies: total_copies.into(),
            available: available.into(),
        }
    }
}

pub struct GetBookDto {
    pub id: Uuid,
}

#[derive(Default)]
pub struct GetBooksDto {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub struct CreateBookDto {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub isbn: String,
    pub total_copies: i32,
}

#[derive(Default)]
pub struct UpdateBookDto {
    pub id: Uuid,
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub isbn: Option<String>,
    pub total_copies: Option<i32>,
}

pub struct DeleteBookDto {
    pub id: Uuid,
}
