use crate::controller::Intake;
use application::transfer::DashboardDto;
use kernel::prelude::policy::Actor;
use time::OffsetDateTime;

pub struct Transformer;

impl Intake<Actor> for Transformer {
    type To = DashboardDto;
    fn emit(&self, input: Actor) -> Self::To {
        DashboardDto {
            actor: input,
            now: OffsetDateTime::now_utc(),
        }
    }
}
