use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Fromln, AsRefln)]
pub struct Returned(bool);

impl Returned {
    pub fn new(returned: impl Into<bool>) -> Self {
        Self(returned.into())
    }
}
