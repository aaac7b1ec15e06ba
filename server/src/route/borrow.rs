mod request;
mod response;

use crate::auth::CurrentActor;
use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::route::borrow::request::{CreateRequest, GetRequest, Transformer, UpdateRequest};
use crate::route::borrow::response::{BorrowResponse, Presenter};
use application::service::{CreateBorrowService, GetBorrowService, UpdateBorrowService};
use application::transfer::GetBorrowDto;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use kernel::prelude::entity::UserId;
use kernel::prelude::policy::{Action, Resource};
use kernel::EntityKind;
use time::OffsetDateTime;
use uuid::Uuid;

pub trait BorrowRouter {
    fn route_borrow(self) -> Self;
}

impl BorrowRouter for Router<AppModule> {
    fn route_borrow(self) -> Self {
        self.route(
            "/books/:id/borrow",
            post(
                |State(module): State<AppModule>,
                 actor: CurrentActor,
                 Path(book_id): Path<Uuid>| async move {
                    let borrower = actor.authorize(Action::Borrow, Resource::Book)?;
                    let req = CreateRequest::new(
                        *borrower.id().as_ref(),
                        book_id,
                        OffsetDateTime::now_utc(),
                    );
                    Controller::new(Transformer, Presenter)
                        .intake(req)
                        .handle(|dto| async move { module.database().create_borrow(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                        .map(|res: Json<BorrowResponse>| (StatusCode::CREATED, res))
                },
            ),
        )
        .route(
            "/borrows/:id",
            get(
                |State(module): State<AppModule>,
                 actor: CurrentActor,
                 Path(id): Path<Uuid>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(GetRequest::new(id))
                        .handle(|dto| async move {
                            let borrow = module
                                .database()
                                .get_borrow(dto)
                                .await?
                                .ok_or_else(|| ErrorStatus::not_found(EntityKind::Borrow))?;
                            let borrower_id = UserId::new(borrow.borrower_id);
                            actor.authorize(
                                Action::Read,
                                Resource::Borrow {
                                    borrower_id: &borrower_id,
                                },
                            )?;
                            Ok::<_, ErrorStatus>(borrow)
                        })
                        .await
                },
            )
            .patch(
                |State(module): State<AppModule>,
                 actor: CurrentActor,
                 Path(id): Path<Uuid>,
                 Json(req): Json<UpdateRequest>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake((id, req))
                        .handle(|dto| async move {
                            let current = module
                                .database()
                                .get_borrow(GetBorrowDto { id: dto.id })
                                .await?
                                .ok_or_else(|| ErrorStatus::not_found(EntityKind::Borrow))?;
                            let borrower_id = UserId::new(current.borrower_id);
                            actor.authorize(
                                Action::Update,
                                Resource::Borrow {
                                    borrower_id: &borrower_id,
                                },
                            )?;
                            Ok::<_, ErrorStatus>(module.database().update_borrow(dto).await?)
                        })
                        .await
                },
            ),
        )
    }
}
