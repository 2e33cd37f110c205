use serde::{Deserialize, Serialize};

/// A filter dimension that is either bypassed (`All`) or pinned to one value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Selection<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selection<T> {
    /// Returns true when `value` passes this filter dimension.
    #[must_use]
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }
}

impl<T> From<Option<T>> for Selection<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Selection::All, Selection::Only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_matches_everything() {
        let sel: Selection<u8> = Selection::All;
        assert!(sel.matches(&1));
        assert!(sel.matches(&200));
    }

    #[test]
    fn only_matches_its_value() {
        let sel = Selection::from(Some(3_u8));
        assert!(sel.matches(&3));
        assert!(!sel.matches(&4));
    }
}
