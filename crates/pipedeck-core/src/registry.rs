//! Instance registry: candidate lists and immutable cursors over them.
//!
//! # Design
//! - `InstanceList` is validated once and shared by reference.
//! - `RegistryState` is a value; `advance` returns a new state instead of
//!   mutating, so concurrent failover sequences never share a cursor.
//! - Advancing past the tail wraps to the head of the original list.

use std::collections::HashSet;
use std::sync::Arc;

use pipedeck_models::Instance;

use crate::error::{FetchError, FetchResult};

/// Ordered candidate mirrors, unique by base URL, in preference order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstanceList {
    instances: Arc<[Instance]>,
}

impl InstanceList {
    /// Build a list, rejecting duplicate base URLs.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::DuplicateInstance`] when two entries share a base
    /// URL (ignoring a trailing slash).
    pub fn new(instances: Vec<Instance>) -> FetchResult<Self> {
        let mut seen = HashSet::new();
        for instance in &instances {
            let key = instance.api_url.as_str().trim_end_matches('/');
            if !seen.insert(key) {
                return Err(FetchError::DuplicateInstance {
                    api_url: instance.api_url.to_string(),
                });
            }
        }
        Ok(Self {
            instances: instances.into(),
        })
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the list has no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Candidates as a slice, in preference order.
    #[must_use]
    pub fn as_slice(&self) -> &[Instance] {
        &self.instances
    }

    /// Iterate the candidates in preference order.
    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.instances.iter()
    }
}

impl TryFrom<Vec<Instance>> for InstanceList {
    type Error = FetchError;

    fn try_from(instances: Vec<Instance>) -> FetchResult<Self> {
        Self::new(instances)
    }
}

/// Cursor over an [`InstanceList`] for one failover sequence.
///
/// The working list is the origin from the cursor onwards; `current` is its
/// head. An empty origin yields an empty working list and no current instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryState {
    origin: InstanceList,
    cursor: usize,
}

impl RegistryState {
    /// Start a sequence at the head of `list`.
    #[must_use]
    pub fn seed(list: &InstanceList) -> Self {
        Self {
            origin: list.clone(),
            cursor: 0,
        }
    }

    /// Drop the current head, re-seeding from the origin once exhausted.
    #[must_use]
    pub fn advance(&self) -> Self {
        let next = self.cursor + 1;
        Self {
            origin: self.origin.clone(),
            cursor: if next >= self.origin.len() { 0 } else { next },
        }
    }

    /// Instance the next attempt should target.
    #[must_use]
    pub fn current(&self) -> Option<&Instance> {
        self.origin.as_slice().get(self.cursor)
    }

    /// Remaining candidates, starting with [`RegistryState::current`].
    #[must_use]
    pub fn working_list(&self) -> &[Instance] {
        self.origin.as_slice().get(self.cursor..).unwrap_or_default()
    }

    /// Number of candidates in the origin list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.origin.len()
    }

    /// Whether the origin list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.origin.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn list(names: &[&str]) -> InstanceList {
        let instances = names
            .iter()
            .map(|name| {
                Instance::new(
                    *name,
                    Url::parse(&format!("https://{name}.mirror.test")).expect("url"),
                )
            })
            .collect();
        InstanceList::new(instances).expect("list")
    }

    fn current_name(state: &RegistryState) -> Option<&str> {
        state.current().map(|instance| instance.name.as_str())
    }

    #[test]
    fn seed_points_at_head() {
        let state = RegistryState::seed(&list(&["x", "y", "z"]));
        assert_eq!(current_name(&state), Some("x"));
        assert_eq!(state.working_list().len(), 3);
    }

    #[test]
    fn advance_drops_head_and_wraps() {
        let origin = list(&["x", "y", "z"]);
        let seeded = RegistryState::seed(&origin);
        let second = seeded.advance();
        assert_eq!(current_name(&second), Some("y"));
        assert_eq!(second.working_list().len(), 2);
        assert_eq!(current_name(&seeded), Some("x"));

        let wrapped = second.advance().advance();
        assert_eq!(current_name(&wrapped), Some("x"));
        assert_eq!(wrapped.working_list().len(), 3);
    }

    #[test]
    fn n_advances_return_to_head() {
        for size in 1..=6 {
            let names: Vec<String> = (0..size).map(|idx| format!("m{idx}")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let origin = list(&refs);
            let seeded = RegistryState::seed(&origin);
            let mut state = seeded.clone();
            for _ in 0..size {
                state = state.advance();
            }
            assert_eq!(state, seeded, "list of {size} did not wrap");
        }
    }

    #[test]
    fn empty_list_has_no_current() {
        let state = RegistryState::seed(&InstanceList::default());
        assert!(state.current().is_none());
        assert!(state.working_list().is_empty());
        assert!(state.advance().current().is_none());
    }

    #[test]
    fn duplicates_are_rejected() {
        let a = Instance::new("a", Url::parse("https://same.test").expect("url"));
        let b = Instance::new("b", Url::parse("https://same.test/").expect("url"));
        assert!(matches!(
            InstanceList::new(vec![a, b]),
            Err(FetchError::DuplicateInstance { .. })
        ));
    }
}
