use sqlx::PgConnection;
use uuid::Uuid;

use kernel::interface::query::{DependOnUserQuery, UserQuery};
use kernel::interface::update::{DependOnUserModifier, UserModifier};
use kernel::prelude::entity::{User, UserEmail, UserId, UserName, UserRole};
use kernel::KernelError;

use crate::database::postgres::{PostgresDatabase, PostgresTransaction};
use crate::error::ConvertError;

pub struct PostgresUserRepository;

#[async_trait::async_trait]
impl UserQuery for PostgresUserRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &UserId,
    ) -> error_stack::Result<Option<User>, KernelError> {
        PgUserInternal::find_by_id(con, id).await
    }

    async fn find_by_email(
        &self,
        con: &mut PostgresTransaction,
        email: &UserEmail,
    ) -> error_stack::Result<Option<User>, KernelError> {
        PgUserInternal::find_by_email(con, email).await
    }
}

#[async_trait::async_trait]
impl UserModifier for PostgresUserRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        user: &User,
    ) -> error_stack::Result<(), KernelError> {
        PgUserInternal::create(con, user).await
    }
}

impl DependOnUserQuery for PostgresDatabase {
    type UserQuery = PostgresUserRepository;
    fn user_query(&self) -> &Self::UserQuery {
        &PostgresUserRepository
    }
}

impl DependOnUserModifier for PostgresDatabase {
    type UserModifier = PostgresUserRepository;
    fn user_modifier(&self) -> &Self::UserModifier {
        &PostgresUserRepository
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
}

impl TryFrom<UserRow> for User {
    type Error = error_stack::Report<KernelError>;
    fn try_from(value: UserRow) -> Result<Self, Self::Error> {
        Ok(User::new(
            UserId::new(value.id),
            UserName::new(value.name),
            UserEmail::new(value.email),
            value.role.parse::<UserRole>()?,
        ))
    }
}

pub(in crate::database) struct PgUserInternal;

impl PgUserInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &UserId,
    ) -> error_stack::Result<Option<User>, KernelError> {
        let row = sqlx::query_as::<_, UserRow>(
            // language=postgresql
            r#"
            SELECT id, name, email, role
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_email(
        con: &mut PgConnection,
        email: &UserEmail,
    ) -> error_stack::Result<Option<User>, KernelError> {
        let row = sqlx::query_as::<_, UserRow>(
            // language=postgresql
            r#"
            SELECT id, name, email, role
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(User::try_from).transpose()
    }

    async fn create(con: &mut PgConnection, user: &User) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user.id().as_ref())
        .bind(user.name().as_ref())
        .bind(user.email().as_ref())
        .bind(user.role().as_str())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use kernel::interface::database::{DatabaseConnection, Transaction};
    use kernel::interface::query::UserQuery;
    use kernel::interface::update::UserModifier;
    use kernel::prelude::entity::UserRole;
    use kernel::{ConflictKind, KernelError};

    use crate::database::postgres::test_support;
    use crate::database::postgres::{PostgresDatabase, PostgresUserRepository};

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;

        let user = test_support::user(UserRole::Librarian);
        PostgresUserRepository.create(&mut con, &user).await?;

        let found = PostgresUserRepository.find_by_id(&mut con, user.id()).await?;
        assert_eq!(found, Some(user.clone()));
        let found = PostgresUserRepository
            .find_by_email(&mut con, user.email())
            .await?;
        assert_eq!(found, Some(user.clone()));

        con.roll_back().await?;
        Ok(())
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn duplicate_email_is_a_conflict() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;

        let user = test_support::user(UserRole::Member);
        PostgresUserRepository.create(&mut con, &user).await?;
        let twin = test_support::user(UserRole::Member)
            .into_destruct();
        let twin = kernel::prelude::entity::User::new(
            twin.id,
            twin.name,
            user.email().clone(),
            twin.role,
        );
        let error = PostgresUserRepository
            .create(&mut con, &twin)
            .await
            .expect_err("email must be unique");
        assert_eq!(
            error.current_context(),
            &KernelError::Conflict(ConflictKind::EmailTaken)
        );

        con.roll_back().await?;
        Ok(())
    }
}
