mod request;
mod response;

use crate::auth::CurrentActor;
use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::route::dashboard::request::Transformer;
use crate::route::dashboard::response::Presenter;
use application::service::DashboardService;
use axum::extract::State;
use axum::routing::get;
use axum::Router;
use kernel::prelude::policy::{Action, Resource};

pub trait DashboardRouter {
    fn route_dashboard(self) -> Self;
}

impl DashboardRouter for Router<AppModule> {
    fn route_dashboard(self) -> Self {
        self.route(
            "/dashboard",
            get(
                |State(module): State<AppModule>, actor: CurrentActor| async move {
                    let actor = actor.authorize(Action::Read, Resource::Dashboard)?.clone();
                    Controller::new(Transformer, Presenter)
                        .intake(actor)
                        .handle(|dto| async move { module.database().dashboard(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
