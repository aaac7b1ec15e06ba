mod availability;
mod book;
mod borrow;
mod report;
mod user;

pub use self::{availability::*, book::*, borrow::*, report::*, user::*};

#[cfg(test)]
mod test_support;
