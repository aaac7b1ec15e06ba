use kernel::interface::query::{DependOnUserQuery, UserQuery};
use kernel::interface::update::{DependOnUserModifier, UserModifier};
use kernel::prelude::entity::{User, UserEmail, UserId};
use kernel::{ConflictKind, KernelError};

use crate::database::memory::{conflict, dangling, InMemoryDatabase, InMemoryTransaction};

pub struct InMemoryUserRepository;

#[async_trait::async_trait]
impl UserQuery for InMemoryUserRepository {
    type Transaction = InMemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut InMemoryTransaction,
        id: &UserId,
    ) -> error_stack::Result<Option<User>, KernelError> {
        Ok(con.tables().users.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        con: &mut InMemoryTransaction,
        email: &UserEmail,
    ) -> error_stack::Result<Option<User>, KernelError> {
        Ok(con
            .tables()
            .users
            .values()
            .find(|user| user.email() == email)
            .cloned())
    }
}

#[async_trait::async_trait]
impl UserModifier for InMemoryUserRepository {
    type Transaction = InMemoryTransaction;

    async fn create(
        &self,
        con: &mut InMemoryTransaction,
        user: &User,
    ) -> error_stack::Result<(), KernelError> {
        let tables = con.tables_mut()?;
        if tables.users.contains_key(user.id()) {
            return Err(dangling("user id already exists"));
        }
        if tables.users.values().any(|other| other.email() == user.email()) {
            return Err(conflict(ConflictKind::EmailTaken));
        }
        tables.users.insert(user.id().clone(), user.clone());
        Ok(())
    }
}

impl DependOnUserQuery for InMemoryDatabase {
    type UserQuery = InMemoryUserRepository;
    fn user_query(&self) -> &Self::UserQuery {
        &InMemoryUserRepository
    }
}

impl DependOnUserModifier for InMemoryDatabase {
    type UserModifier = InMemoryUserRepository;
    fn user_modifier(&self) -> &Self::UserModifier {
        &InMemoryUserRepository
    }
}

#[cfg(test)]
mod test {
    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::UserQuery;
    use kernel::interface::update::UserModifier;
    use kernel::prelude::entity::UserRole;
    use kernel::{ConflictKind, KernelError};

    use crate::database::memory::test::user;
    use crate::database::memory::{InMemoryDatabase, InMemoryUserRepository};

    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let mut con = db.transact().await?;
        let member = user("member@example.com", UserRole::Member);
        InMemoryUserRepository.create(&mut con, &member).await?;

        let found = InMemoryUserRepository.find_by_id(&mut con, member.id()).await?;
        assert_eq!(found, Some(member.clone()));
        let found = InMemoryUserRepository
            .find_by_email(&mut con, member.email())
            .await?;
        assert_eq!(found, Some(member));

        let error = InMemoryUserRepository
            .create(&mut con, &user("member@example.com", UserRole::Librarian))
            .await
            .expect_err("email must be unique");
        assert_eq!(
            error.current_context(),
            &KernelError::Conflict(ConflictKind::EmailTaken)
        );
        Ok(())
    }
}
