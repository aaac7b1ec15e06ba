mod book;
mod borrow;
mod report;
mod user;

pub use self::{book::*, borrow::*, report::*, user::*};
