//! Automatic route resolution strategies.

use std::fmt;
use std::sync::Arc;

use weft_framework::Resolver;

/// How an unmatched path is turned into a handler identifier.
#[derive(Clone)]
pub enum AutoRoute {
    /// Title-cases each path segment and joins them with `::` under a
    /// namespace: `/user/profile` becomes `Ns::User::Profile`. The root path
    /// maps to `Index`. An empty namespace adds no prefix.
    Namespace(String),
    /// A custom mapping.
    Custom(Resolver),
}

impl AutoRoute {
    /// Creates a [`AutoRoute::Custom`] strategy.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Maps `path` to an identifier.
    pub fn resolve(&self, path: &str) -> Option<String> {
        match self {
            Self::Namespace(namespace) => Some(namespaced_identifier(namespace, path)),
            Self::Custom(resolver) => resolver(path),
        }
    }
}

impl fmt::Debug for AutoRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Namespace(namespace) => f.debug_tuple("Namespace").field(namespace).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Builds the identifier [`AutoRoute::Namespace`] resolves `path` to.
pub fn namespaced_identifier(namespace: &str, path: &str) -> String {
    let mut parts: Vec<String> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(title_case)
        .collect();
    if parts.is_empty() {
        parts.push("Index".to_string());
    }

    let joined = parts.join("::");
    if namespace.is_empty() {
        joined
    } else {
        format!("{namespace}::{joined}")
    }
}

fn title_case(segment: &str) -> String {
    let lower = segment.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_identifier() {
        assert_eq!(namespaced_identifier("App", "/user/PROFILE"), "App::User::Profile");
        assert_eq!(namespaced_identifier("App", "/"), "App::Index");
        assert_eq!(namespaced_identifier("", "/blog/"), "Blog");
        assert_eq!(namespaced_identifier("", ""), "Index");
    }

    #[test]
    fn test_custom_strategy() {
        let strategy = AutoRoute::custom(|path| path.strip_prefix("/api/").map(str::to_uppercase));
        assert_eq!(strategy.resolve("/api/users"), Some("USERS".to_string()));
        assert_eq!(strategy.resolve("/users"), None);
    }
}
