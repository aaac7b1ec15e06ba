use error_stack::Report;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{DependOnUserQuery, UserQuery};
use kernel::interface::update::{DependOnUserModifier, UserModifier};
use kernel::prelude::entity::{User, UserEmail, UserId, UserName};
use kernel::{ConflictKind, KernelError};

use crate::transfer::{CreateUserDto, GetUserDto, UserDto};

#[async_trait::async_trait]
pub trait GetUserService: 'static + Sync + Send + DependOnUserQuery {
    async fn get_user(&self, dto: GetUserDto) -> error_stack::Result<Option<UserDto>, KernelError> {
        let mut connection = self.database_connection().snapshot().await?;
        let id = UserId::new(dto.id);
        let user = self.user_query().find_by_id(&mut connection, &id).await?;
        connection.commit().await?;
        Ok(user.map(UserDto::from))
    }
}

impl<T> GetUserService for T where T: DependOnUserQuery {}

#[async_trait::async_trait]
pub trait CreateUserService:
    'static + Sync + Send + DependOnUserQuery + DependOnUserModifier
{
    async fn create_user(&self, dto: CreateUserDto) -> error_stack::Result<UserDto, KernelError> {
        let name = UserName::try_new(dto.name)?;
        let email = UserEmail::try_new(dto.email)?;

        let mut connection = self.database_connection().transact().await?;
        if self
            .user_query()
            .find_by_email(&mut connection, &email)
            .await?
            .is_some()
        {
            return Err(Report::new(KernelError::Conflict(ConflictKind::EmailTaken)));
        }

        let user = User::new(UserId::default(), name, email, dto.role);
        self.user_modifier().create(&mut connection, &user).await?;
        connection.commit().await?;

        Ok(UserDto::from(user))
    }
}

impl<T> CreateUserService for T where T: DependOnUserQuery + DependOnUserModifier {}
