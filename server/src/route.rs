mod book;
mod borrow;
mod dashboard;

pub use self::{book::*, borrow::*, dashboard::*};
