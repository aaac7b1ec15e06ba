use std::fmt::Display;

use error_stack::Context;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum EntityKind {
    Book,
    Borrow,
    User,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Book => write!(f, "Book"),
            EntityKind::Borrow => write!(f, "Borrow"),
            EntityKind::User => write!(f, "User"),
        }
    }
}

/// Business rules a request can collide with.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ConflictKind {
    /// Every copy of the book is lent out.
    BookUnavailable,
    /// The borrower already holds an active borrow of the book.
    AlreadyBorrowed,
    IsbnTaken,
    EmailTaken,
    /// The book still has copies out on loan.
    BookOnLoan,
}

impl Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictKind::BookUnavailable => write!(f, "book is not available for borrowing"),
            ConflictKind::AlreadyBorrowed => write!(f, "book is already borrowed by this user"),
            ConflictKind::IsbnTaken => write!(f, "isbn has already been taken"),
            ConflictKind::EmailTaken => write!(f, "email has already been taken"),
            ConflictKind::BookOnLoan => write!(f, "book still has copies on loan"),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum KernelError {
    NotFound(EntityKind),
    Conflict(ConflictKind),
    InvalidInput,
    Concurrency,
    Timeout,
    Internal,
}

impl Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::NotFound(kind) => write!(f, "{kind} not found"),
            KernelError::Conflict(kind) => write!(f, "Conflict: {kind}"),
            KernelError::InvalidInput => write!(f, "Invalid input"),
            KernelError::Concurrency => write!(f, "Concurrency error"),
            KernelError::Timeout => write!(f, "Process timed out"),
            KernelError::Internal => write!(f, "Internal kernel error"),
        }
    }
}

impl Context for KernelError {}
