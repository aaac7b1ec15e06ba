mod operation;
mod text;
mod time;

pub use self::{operation::*, time::*};
pub(crate) use self::text::*;
