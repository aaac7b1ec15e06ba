use uuid::Uuid;

use kernel::prelude::entity::{DestructUser, User, UserId, UserRole};
use kernel::prelude::policy::Actor;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let DestructUser {
            id,
            name,
            email,
            role,
        } = value.into_destruct();
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role,
        }
    }
}

impl From<&UserDto> for Actor {
    fn from(value: &UserDto) -> Self {
        Actor::new(UserId::new(value.id), value.role)
    }
}

pub struct GetUserDto {
    pub id: Uuid,
}

pub struct CreateUserDto {
    pub name: String,
    pub email: String,
    pub role: UserRole,
}
