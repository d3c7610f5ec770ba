//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Validate and store route definitions in declared order
//! - Look up the matching route for a request path
//! - Support navigation by route name
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) lookup for static paths and names via HashMap
//! - O(n) scan over parameterised patterns, first declared wins
//! - Explicit no-match rather than silent default

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;

use crate::routing::matcher::{normalize_path, split_segments, Params, PathPattern};
use crate::views::ViewRef;

/// Errors raised while constructing a [`PageRouter`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("invalid route path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
    #[error("duplicate route path '{0}'")]
    DuplicatePath(String),
    #[error("duplicate route name '{0}'")]
    DuplicateName(String),
}

/// Arbitrary key/value data attached to a route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RouteMeta(BTreeMap<String, String>);

impl RouteMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The `title` entry, used as the document title.
    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RouteMeta {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A single entry of the route table.
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    /// URL path pattern, starting with `/`.
    pub path: String,
    /// Identifier for navigation by name.
    pub name: Option<String>,
    /// View rendered for this route.
    pub component: ViewRef,
    /// Data consumed by page chrome (e.g. `title`).
    pub meta: Option<RouteMeta>,
}

impl RouteDefinition {
    pub fn new(path: impl Into<String>, component: ViewRef) -> Self {
        Self {
            path: path.into(),
            name: None,
            component,
            meta: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_meta(mut self, meta: RouteMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// The declared name, ignoring empty strings.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    pub fn title(&self) -> Option<&str> {
        self.meta.as_ref().and_then(RouteMeta::title)
    }

    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            path: self.path.clone(),
            name: self.name().map(str::to_string),
            component: self.component.name(),
            meta: self.meta.clone(),
        }
    }
}

/// Serializable view of a route, exposed on `/api/routes`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub component: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<RouteMeta>,
}

/// Result of a successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a RouteDefinition,
    pub params: Params,
}

#[derive(Debug)]
struct CompiledRoute {
    definition: RouteDefinition,
    pattern: PathPattern,
}

#[derive(Debug)]
struct RouteTable {
    routes: Vec<CompiledRoute>,
    static_paths: HashMap<String, usize>,
    names: HashMap<String, usize>,
}

/// Handle to an initialized, immutable route table.
///
/// Cloning is cheap; all clones share the same table.
#[derive(Debug, Clone)]
pub struct PageRouter {
    table: Arc<RouteTable>,
}

impl PageRouter {
    /// Build a router from an ordered sequence of route definitions.
    ///
    /// Fails when a path is malformed, when two paths share a shape, or when
    /// two non-empty names collide.
    pub fn construct(
        routes: impl IntoIterator<Item = RouteDefinition>,
    ) -> Result<Self, RouteError> {
        let mut compiled = Vec::new();
        let mut shapes = HashMap::new();
        let mut static_paths = HashMap::new();
        let mut names = HashMap::new();

        for definition in routes {
            let pattern = PathPattern::parse(&definition.path)?;
            let index = compiled.len();

            if shapes.insert(pattern.shape(), index).is_some() {
                return Err(RouteError::DuplicatePath(definition.path.clone()));
            }
            if let Some(name) = definition.name() {
                if names.insert(name.to_string(), index).is_some() {
                    return Err(RouteError::DuplicateName(name.to_string()));
                }
            }
            if pattern.is_static() {
                static_paths.insert(normalize_path(pattern.as_str()), index);
            }

            compiled.push(CompiledRoute {
                definition,
                pattern,
            });
        }

        tracing::debug!(routes = compiled.len(), "Route table constructed");

        Ok(Self {
            table: Arc::new(RouteTable {
                routes: compiled,
                static_paths,
                names,
            }),
        })
    }

    /// Resolve a request path (query strings and trailing slashes ignored).
    ///
    /// Static routes take precedence over parameterised ones.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let normalized = normalize_path(path);
        if let Some(&index) = self.table.static_paths.get(&normalized) {
            return Some(RouteMatch {
                route: &self.table.routes[index].definition,
                params: Params::new(),
            });
        }

        let segments = split_segments(path);
        self.table
            .routes
            .iter()
            .filter(|r| !r.pattern.is_static())
            .find_map(|r| {
                r.pattern.matches(&segments).map(|params| RouteMatch {
                    route: &r.definition,
                    params,
                })
            })
    }

    /// Find a route by its declared name.
    pub fn by_name(&self, name: &str) -> Option<&RouteDefinition> {
        self.table
            .names
            .get(name)
            .map(|&i| &self.table.routes[i].definition)
    }

    /// Build the concrete path of a named route.
    pub fn href(&self, name: &str, params: &Params) -> Option<String> {
        let index = *self.table.names.get(name)?;
        self.table.routes[index].pattern.fill(params)
    }

    /// Route definitions in declared order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.table.routes.iter().map(|r| &r.definition)
    }

    pub fn len(&self) -> usize {
        self.table.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.routes.is_empty()
    }
}

/// Document title for a route: its `title` meta, else `default`.
pub fn title_for<'a>(route: &'a RouteDefinition, default: &'a str) -> &'a str {
    route.title().unwrap_or(default)
}
