use driver::database::InMemoryDatabase;
use kernel::prelude::entity::UserRole;
use kernel::KernelError;

use crate::service::{CreateBookService, CreateUserService};
use crate::transfer::{BookDto, CreateBookDto, CreateUserDto, UserDto};

pub(crate) async fn book(
    db: &InMemoryDatabase,
    isbn: &str,
    total_copies: i32,
) -> error_stack::Result<BookDto, KernelError> {
    db.create_book(CreateBookDto {
        title: format!("Book {isbn}"),
        author: "Ursula K. Le Guin".to_string(),
        genre: "Fantasy".to_string(),
        isbn: isbn.to_string(),
        total_copies,
    })
    .await
}

pub(crate) async fn user(
    db: &InMemoryDatabase,
    name: &str,
    role: UserRole,
) -> error_stack::Result<UserDto, KernelError> {
    db.create_user(CreateUserDto {
        name: name.to_string(),
        email: format!("{name}@example.com"),
        role,
    })
    .await
}
