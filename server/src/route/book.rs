mod request;
mod response;

use crate::auth::CurrentActor;
use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::route::book::request::{
    CreateRequest, DeleteRequest, GetAllRequest, GetRequest, Transformer, UpdateRequest,
};
use crate::route::book::response::{BookResponse, Presenter};
use application::service::{
    CreateBookService, DeleteBookService, GetBookService, UpdateBookService,
};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::Query;
use kernel::prelude::policy::{Action, Resource};
use uuid::Uuid;

pub trait BookRouter {
    fn route_book(self) -> Self;
}

impl BookRouter for Router<AppModule> {
    fn route_book(self) -> Self {
        self.route(
            "/books",
            get(
                |State(module): State<AppModule>,
                 actor: CurrentActor,
                 Query(req): Query<GetAllRequest>| async move {
                    actor.authorize(Action::Read, Resource::Book)?;
                    Controller::new(Transformer, Presenter)
                        .intake(req)
                        .handle(|dto| async move { module.database().get_books(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .post(
                |State(module): State<AppModule>,
                 actor: CurrentActor,
                 Json(req): Json<CreateRequest>| async move {
                    actor.authorize(Action::Create, Resource::Book)?;
                    Controller::new(Transformer, Presenter)
                        .intake(req)
                        .handle(|dto| async move { module.database().create_book(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                        .map(|res: Json<BookResponse>| (StatusCode::CREATED, res))
                },
            ),
        )
        .route(
            "/books/:id",
            get(
                |State(module): State<AppModule>,
                 actor: CurrentActor,
                 Path(id): Path<Uuid>| async move {
                    actor.authorize(Action::Read, Resource::Book)?;
                    Controller::new(Transformer, Presenter)
                        .intake(GetRequest::new(id))
                        .handle(|dto| async move { module.database().get_book(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                        .map(|res| {
                            res.map(IntoResponse::into_response)
                                .unwrap_or_else(|| StatusCode::NOT_FOUND.into_response())
                        })
                },
            )
            .patch(
                |State(module): State<AppModule>,
                 actor: CurrentActor,
                 Path(id): Path<Uuid>,
                 Json(req): Json<UpdateRequest>| async move {
                    actor.authorize(Action::Update, Resource::Book)?;
                    Controller::new(Transformer, Presenter)
                        .intake((id, req))
                        .handle(|dto| async move { module.database().update_book(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .delete(
                |State(module): State<AppModule>,
                 actor: CurrentActor,
                 Path(id): Path<Uuid>| async move {
                    actor.authorize(Action::Destroy, Resource::Book)?;
                    Controller::new(Transformer, Presenter)
                        .intake(DeleteRequest::new(id))
                        .handle(|dto| async move { module.database().delete_book(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
