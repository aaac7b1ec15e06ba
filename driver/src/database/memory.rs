use std::collections::HashMap;
use std::sync::Arc;

use error_stack::Report;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::prelude::entity::{Book, BookId, Borrow, BorrowId, User, UserId};
use kernel::{ConflictKind, KernelError};

pub use self::{book::*, borrow::*, report::*, user::*};

mod book;
mod borrow;
mod report;
mod user;

#[derive(Debug, Clone, Default)]
struct Tables {
    books: HashMap<BookId, Book>,
    borrows: HashMap<BorrowId, Borrow>,
    users: HashMap<UserId, User>,
}

/// Process-local store. Read-write transactions hold the write lock from
/// `transact` until commit or drop, so they run one at a time.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DatabaseConnection for InMemoryDatabase {
    type Transaction = InMemoryTransaction;

    async fn transact(&self) -> error_stack::Result<Self::Transaction, KernelError> {
        let guard = Arc::clone(&self.tables).write_owned().await;
        let staged = guard.clone();
        Ok(InMemoryTransaction(Access::Write { guard, staged }))
    }

    async fn snapshot(&self) -> error_stack::Result<Self::Transaction, KernelError> {
        let guard = Arc::clone(&self.tables).read_owned().await;
        Ok(InMemoryTransaction(Access::Read(guard)))
    }
}

pub struct InMemoryTransaction(Access);

enum Access {
    Write {
        guard: OwnedRwLockWriteGuard<Tables>,
        staged: Tables,
    },
    Read(OwnedRwLockReadGuard<Tables>),
}

impl InMemoryTransaction {
    fn tables(&self) -> &Tables {
        match &self.0 {
            Access::Write { staged, .. } => staged,
            Access::Read(guard) => &**guard,
        }
    }

    fn tables_mut(&mut self) -> error_stack::Result<&mut Tables, KernelError> {
        match &mut self.0 {
            Access::Write { staged, .. } => Ok(staged),
            Access::Read(_) => Err(Report::new(KernelError::Internal)
                .attach_printable("write attempted inside a read-only snapshot")),
        }
    }
}

#[async_trait::async_trait]
impl Transaction for InMemoryTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        if let Access::Write { mut guard, staged } = self.0 {
            *guard = staged;
        }
        Ok(())
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        Ok(())
    }
}

fn conflict(kind: ConflictKind) -> Report<KernelError> {
    let context = KernelError::Conflict(kind);
    tracing::debug!(?context, "in-memory store rejected operation");
    Report::new(context)
}

fn dangling(reason: &'static str) -> Report<KernelError> {
    tracing::warn!(reason, "in-memory store rejected operation");
    Report::new(KernelError::Internal).attach_printable(reason)
}
