//! Navigation handoff to the hosting shell.

use std::fmt;

use crate::query::Query;

/// Receives navigation targets produced by search submission.
pub trait Router: Send + Sync {
    /// Navigate to `target`, a path with query string.
    fn push(&self, target: &str);
}

/// Search results route, `/search?q={joinedQuery}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchRoute(String);

impl SearchRoute {
    /// Route for `query`, using its transport encoding.
    #[must_use]
    pub fn for_query(query: &Query) -> Self {
        Self(format!("/search?q={}", query.joined()))
    }

    /// Route as a path string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the route and return the path string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SearchRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_uses_joined_query() {
        let query = Query::parse("lo fi & chill").expect("eligible");
        let route = SearchRoute::for_query(&query);
        assert_eq!(route.as_str(), "/search?q=lo+fi+%26+chill");
        assert_eq!(route.to_string(), route.clone().into_string());
    }
}
