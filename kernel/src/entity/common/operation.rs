use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

const MAX_SELECT_LIMIT: i64 = 100;

/// Page size for list queries, kept within `1..=100`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct SelectLimit(i64);

impl SelectLimit {
    pub fn new(value: impl Into<i64>) -> Self {
        SelectLimit(value.into().clamp(1, MAX_SELECT_LIMIT))
    }
}

impl Default for SelectLimit {
    fn default() -> Self {
        Self::new(30)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct SelectOffset(i64);

impl SelectOffset {
    pub fn new(value: impl Into<i64>) -> Self {
        SelectOffset(value.into().max(0))
    }
}

#[cfg(test)]
mod test {
    use super::{SelectLimit, SelectOffset};

    #[test]
    fn limit_is_clamped() {
        assert_eq!(SelectLimit::new(0), SelectLimit::new(1));
        assert_eq!(SelectLimit::new(1000), SelectLimit::new(100));
        assert_eq!(SelectLimit::default().as_ref(), &30);
    }

    #[test]
    fn negative_offset_is_zero() {
        assert_eq!(SelectOffset::new(-5), SelectOffset::default());
    }
}
