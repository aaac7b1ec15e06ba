use crate::controller::Exhaust;
use application::transfer::BookDto;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct BookResponse {
    id: Uuid,
    title: String,
    author: String,
    genre: String,
    isbn: String,
    total_copies: i32,
    available: bool,
}

impl From<BookDto> for BookResponse {
    fn from(value: BookDto) -> Self {
        Self {
            id: value.id,
            title: value.title,
            author: value.author,
            genre: value.genre,
            isbn: value.isbn,
            total_copies: value.total_copies,
            available: value.available,
        }
    }
}

pub struct Presenter;

impl Exhaust<BookDto> for Presenter {
    type To = Json<BookResponse>;
    fn emit(&self, input: BookDto) -> Self::To {
        Json(BookResponse::from(input))
    }
}

impl Exhaust<Option<BookDto>> for Presenter {
    type To = Option<Json<BookResponse>>;
    fn emit(&self, input: Option<BookDto>) -> Self::To {
        input.map(|book| Json(BookResponse::from(book)))
    }
}

impl Exhaust<Vec<BookDto>> for Presenter {
    type To = Json<Vec<BookResponse>>;
    fn emit(&self, input: Vec<BookDto>) -> Self::To {
        Json(input.into_iter().map(BookResponse::from).collect())
    }
}

impl Exhaust<()> for Presenter {
    type To = StatusCode;
    fn emit(&self, _: ()) -> Self::To {
        StatusCode::NO_CONTENT
    }
}
