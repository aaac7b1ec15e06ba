mod book;
mod borrow;
mod common;
mod user;

pub use self::{book::*, borrow::*, common::*, user::*};
