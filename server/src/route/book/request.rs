use crate::controller::Intake;
use application::transfer::{
    CreateBookDto, DeleteBookDto, GetBookDto, GetBooksDto, UpdateBookDto,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    title: String,
    author: String,
    genre: String,
    isbn: String,
    total_copies: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    title: Option<String>,
    author: Option<String>,
    genre: Option<String>,
    isbn: Option<String>,
    total_copies: Option<i32>,
}

#[derive(Debug)]
pub struct DeleteRequest {
    id: Uuid,
}

impl DeleteRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

#[derive(Debug, Deserialize)]
pub struct GetAllRequest {
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Debug)]
pub struct GetRequest {
    id: Uuid,
}

impl GetRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

pub struct Transformer;

impl Intake<CreateRequest> for Transformer {
    type To = CreateBookDto;
    fn emit(&self, input: CreateRequest) -> Self::To {
        CreateBookDto {
            title: input.title,
            author: input.author,
            genre: input.genre,
            isbn: input.isbn,
            total_copies: input.total_copies,
        }
    }
}

impl Intake<(Uuid, UpdateRequest)> for Transformer {
    type To = UpdateBookDto;
    fn emit(&self, input: (Uuid, UpdateRequest)) -> Self::To {
        let (id, input) = input;
        UpdateBookDto {
            id,
            title: input.title,
            author: input.author,
            genre: input.genre,
            isbn: input.isbn,
            total_copies: input.total_copies,
        }
    }
}

impl Intake<DeleteRequest> for Transformer {
    type To = DeleteBookDto;
    fn emit(&self, input: DeleteRequest) -> Self::To {
        DeleteBookDto { id: input.id }
    }
}

impl Intake<GetRequest> for Transformer {
    type To = GetBookDto;
    fn emit(&self, input: GetRequest) -> Self::To {
        GetBookDto { id: input.id }
    }
}

impl Intake<GetAllRequest> for Transformer {
    type To = GetBooksDto;
    fn emit(&self, input: GetAllRequest) -> Self::To {
        GetBooksDto {
            limit: input.limit,
            offset: input.offset,
        }
    }
}
