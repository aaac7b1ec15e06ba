use std::ops::{Deref, DerefMut};

use error_stack::{Report, ResultExt};
use sqlx::postgres::{PgPoolOptions, PgQueryResult};
use sqlx::{Error, PgConnection, Pool, Postgres};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::{ConflictKind, KernelError};

use crate::env;
use crate::error::ConvertError;

pub use self::{book::*, borrow::*, report::*, user::*};

mod book;
mod borrow;
mod report;
mod user;

static POSTGRES_URL: &str = "POSTGRES_URL";
static POSTGRES_MAX_CONNECTIONS: &str = "POSTGRES_MAX_CONNECTIONS";
const DEFAULT_MAX_CONNECTIONS: u32 = 8;

// Constraint names from migrations/
const ACTIVE_BORROW_KEY: &str = "borrows_active_borrower_book_key";
const BOOK_ISBN_KEY: &str = "books_isbn_key";
const USER_EMAIL_KEY: &str = "users_email_key";

#[derive(Clone)]
pub struct PostgresDatabase {
    pool: Pool<Postgres>,
}

impl PostgresDatabase {
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        let url = env(POSTGRES_URL)?;
        let max_connections = match env(POSTGRES_MAX_CONNECTIONS) {
            Ok(value) => value
                .parse::<u32>()
                .change_context_lazy(|| KernelError::Internal)
                .attach_printable_lazy(|| {
                    format!("{POSTGRES_MAX_CONNECTIONS} must be a positive integer")
                })?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(&url)
            .await
            .convert_error()?;
        tracing::info!(max_connections, "connected to postgres");
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl DatabaseConnection for PostgresDatabase {
    type Transaction = PostgresTransaction;

    async fn transact(&self) -> error_stack::Result<Self::Transaction, KernelError> {
        let transaction = self.pool.begin().await.convert_error()?;
        Ok(PostgresTransaction(transaction))
    }

    async fn snapshot(&self) -> error_stack::Result<Self::Transaction, KernelError> {
        let mut transaction = self.pool.begin().await.convert_error()?;
        // language=postgresql
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *transaction)
            .await
            .convert_error()?;
        Ok(PostgresTransaction(transaction))
    }
}

pub struct PostgresTransaction(sqlx::Transaction<'static, Postgres>);

#[async_trait::async_trait]
impl Transaction for PostgresTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        self.0.commit().await.convert_error()
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        self.0.rollback().await.convert_error()
    }
}

impl Deref for PostgresTransaction {
    type Target = PgConnection;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PostgresTransaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T: 'static> ConvertError for Result<T, Error> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| {
            let context = classify(&error);
            match context {
                KernelError::Internal | KernelError::Timeout => {
                    tracing::warn!(%error, "postgres operation failed")
                }
                _ => tracing::debug!(%error, ?context, "postgres rejected operation"),
            }
            Report::from(error).change_context(context)
        })
    }
}

/// An update keyed by primary key must have touched its row.
fn touched_row(result: PgQueryResult, reason: &'static str) -> error_stack::Result<(), KernelError> {
    if result.rows_affected() == 0 {
        tracing::warn!(reason, "postgres update matched no row");
        return Err(Report::new(KernelError::Internal).attach_printable(reason));
    }
    Ok(())
}

fn classify(error: &Error) -> KernelError {
    match error {
        Error::PoolTimedOut => KernelError::Timeout,
        Error::Database(database) => match (database.code().as_deref(), database.constraint()) {
            // unique_violation
            (Some("23505"), Some(ACTIVE_BORROW_KEY)) => {
                KernelError::Conflict(ConflictKind::AlreadyBorrowed)
            }
            (Some("23505"), Some(BOOK_ISBN_KEY)) => KernelError::Conflict(ConflictKind::IsbnTaken),
            (Some("23505"), Some(USER_EMAIL_KEY)) => {
                KernelError::Conflict(ConflictKind::EmailTaken)
            }
            // serialization_failure, deadlock_detected
            (Some("40001"), _) | (Some("40P01"), _) => KernelError::Concurrency,
            _ => KernelError::Internal,
        },
        _ => KernelError::Internal,
    }
}

#[cfg(test)]
pub(in crate::database) mod test_support {
    use rand::distributions::{Alphanumeric, DistString};
    use rand::Rng;
    use uuid::Uuid;

    use kernel::prelude::entity::{
        Book, BookAuthor, BookAvailable, BookGenre, BookId, BookIsbn, BookTitle,
        BookTotalCopies, User, UserEmail, UserId, UserName, UserRole,
    };

    pub fn book(total_copies: i32) -> Book {
        let isbn: u64 = rand::thread_rng().gen_range(1_000_000_000_000..10_000_000_000_000);
        Book::new(
            BookId::new(Uuid::new_v4()),
            BookTitle::new("The Rust Programming Language"),
            BookAuthor::new("Steve Klabnik"),
            BookGenre::new("Programming"),
            BookIsbn::new(isbn.to_string()),
            BookTotalCopies::new(total_copies),
            BookAvailable::derive(0, &BookTotalCopies::new(total_copies)),
        )
    }

    pub fn user(role: UserRole) -> User {
        let local = Alphanumeric.sample_string(&mut rand::thread_rng(), 12);
        User::new(
            UserId::new(Uuid::new_v4()),
            UserName::new("test"),
            UserEmail::new(format!("{}@example.com", local.to_lowercase())),
            role,
        )
    }
}
