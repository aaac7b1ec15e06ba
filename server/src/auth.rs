use application::service::GetUserService;
use application::transfer::GetUserDto;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use kernel::prelude::policy::{AccessPolicy, Action, Actor, Resource};
use uuid::Uuid;

use crate::error::ErrorStatus;
use crate::handler::AppModule;

/// Set by the authenticating gateway in front of this server.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller behind a request, if the gateway identified a known user.
pub struct CurrentActor(Option<Actor>);

impl CurrentActor {
    pub fn authorize(&self, action: Action, resource: Resource<'_>) -> Result<&Actor, ErrorStatus> {
        match &self.0 {
            None => Err(ErrorStatus::Unauthorized),
            Some(actor) if AccessPolicy::allowed(Some(actor), action, resource) => Ok(actor),
            Some(actor) => {
                tracing::debug!(user = %actor.id().as_ref(), ?action, ?resource, "denied");
                Err(ErrorStatus::Forbidden)
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppModule> for CurrentActor {
    type Rejection = ErrorStatus;

    async fn from_request_parts(
        parts: &mut Parts,
        module: &AppModule,
    ) -> Result<Self, Self::Rejection> {
        let Some(id) = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
        else {
            return Ok(Self(None));
        };
        let user = module.database().get_user(GetUserDto { id }).await?;
        Ok(Self(user.as_ref().map(Actor::from)))
    }
}
