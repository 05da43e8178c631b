//! Nested route tables and literal prefixing.
//!
//! # Design
//! A route table is a tree keyed by segment name. Leaves are path fragments
//! (or lists of fragments); inner nodes group related routes, e.g. `USER`.
//! Prefixing walks the tree and prepends a literal string to every leaf.
//! Separators are never inserted or collapsed: `prefix({A: "x"}, "/p")`
//! yields `{A: "/px"}`, so fragments carry their own `/`.
//!
//! Tables derive `Deserialize` through an untagged enum, so a host can load a
//! custom table from JSON once at startup.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Key path of the user resource route inside the v0 table.
pub const USER_BASE: &str = "USER.BASE";

/// A route tree keyed by segment name.
pub type RouteTable = BTreeMap<String, Route>;

/// A single node of a [`RouteTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Route {
    Path(String),
    Paths(Vec<String>),
    Group(RouteTable),
}

impl Route {
    /// Return a copy of this node with `prefix_str` prepended to every leaf.
    pub fn prefixed(&self, prefix_str: &str) -> Route {
        match self {
            Route::Path(path) => Route::Path(format!("{prefix_str}{path}")),
            Route::Paths(paths) => {
                Route::Paths(paths.iter().map(|path| format!("{prefix_str}{path}")).collect())
            }
            Route::Group(routes) => Route::Group(prefix(routes, prefix_str)),
        }
    }

    pub fn as_path(&self) -> Option<&str> {
        match self {
            Route::Path(path) => Some(path),
            _ => None,
        }
    }
}

impl From<&str> for Route {
    fn from(path: &str) -> Self {
        Route::Path(path.to_string())
    }
}

impl From<Vec<&str>> for Route {
    fn from(paths: Vec<&str>) -> Self {
        Route::Paths(paths.into_iter().map(str::to_string).collect())
    }
}

impl From<RouteTable> for Route {
    fn from(routes: RouteTable) -> Self {
        Route::Group(routes)
    }
}

/// Build a table from `(name, route)` pairs.
pub fn table<const N: usize>(entries: [(&str, Route); N]) -> RouteTable {
    entries
        .into_iter()
        .map(|(name, route)| (name.to_string(), route))
        .collect()
}

/// Prepend `prefix_str` to every leaf of `routes`, leaving the input untouched.
pub fn prefix(routes: &RouteTable, prefix_str: &str) -> RouteTable {
    let mut prefixed = RouteTable::new();
    for (name, route) in routes {
        prefixed.insert(name.clone(), route.prefixed(prefix_str));
    }
    prefixed
}

/// Resolve a dotted key path such as `"USER.BASE"` to its path string.
pub fn lookup<'a>(routes: &'a RouteTable, key_path: &str) -> Result<&'a str, ApiError> {
    let missing = || ApiError::MissingRoute(key_path.to_string());

    let mut segments = key_path.split('.');
    let first = segments.next().ok_or_else(missing)?;
    let mut node = routes.get(first).ok_or_else(missing)?;
    for segment in segments {
        node = match node {
            Route::Group(children) => children.get(segment).ok_or_else(missing)?,
            _ => return Err(missing()),
        };
    }
    node.as_path().ok_or_else(missing)
}

/// The v0 route table, relative to the API base URL.
pub fn api_v0_routes() -> &'static RouteTable {
    static ROUTES: OnceLock<RouteTable> = OnceLock::new();
    ROUTES.get_or_init(|| {
        let user = prefix(&table([("BASE", Route::from("/"))]), "/user");
        prefix(&table([("USER", Route::Group(user))]), "/v0")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_leaf_is_prefixed_literally() {
        let routes = table([("A", Route::from("x"))]);
        let prefixed = prefix(&routes, "/p");
        assert_eq!(prefixed, table([("A", Route::from("/px"))]));
    }

    #[test]
    fn nested_groups_are_prefixed_recursively() {
        let routes = table([(
            "AUTH",
            Route::Group(table([
                ("LOGIN", Route::from("/login")),
                ("DEEP", Route::Group(table([("LEAF", Route::from("/leaf"))]))),
            ])),
        )]);
        let prefixed = prefix(&routes, "/auth");

        assert_eq!(lookup(&prefixed, "AUTH.LOGIN").unwrap(), "/auth/login");
        assert_eq!(lookup(&prefixed, "AUTH.DEEP.LEAF").unwrap(), "/auth/leaf");
    }

    #[test]
    fn array_elements_are_prefixed_independently() {
        let routes = table([("MANY", Route::from(vec!["/a", "/b", ""]))]);
        let prefixed = prefix(&routes, "/v1");
        assert_eq!(prefixed["MANY"], Route::from(vec!["/v1/a", "/v1/b", "/v1"]));
    }

    #[test]
    fn prefix_does_not_touch_input() {
        let routes = table([
            ("A", Route::from("/a")),
            ("G", Route::Group(table([("B", Route::from(vec!["/b"]))]))),
        ]);
        let before = routes.clone();
        let _ = prefix(&routes, "https://example.com");
        assert_eq!(routes, before);
    }

    #[test]
    fn empty_table_stays_empty() {
        assert!(prefix(&RouteTable::new(), "/p").is_empty());
    }

    #[test]
    fn v0_user_base_route() {
        assert_eq!(lookup(api_v0_routes(), USER_BASE).unwrap(), "/v0/user/");
    }

    #[test]
    fn base_url_prefix_yields_absolute_route() {
        let routes = prefix(api_v0_routes(), "https://accounts-api.dynastic.co");
        assert_eq!(
            lookup(&routes, USER_BASE).unwrap(),
            "https://accounts-api.dynastic.co/v0/user/"
        );
    }

    #[test]
    fn lookup_reports_missing_and_non_leaf_keys() {
        let routes = api_v0_routes();
        assert!(matches!(
            lookup(routes, "USER.NOPE"),
            Err(ApiError::MissingRoute(k)) if k == "USER.NOPE"
        ));
        assert!(matches!(lookup(routes, "USER"), Err(ApiError::MissingRoute(_))));
        assert!(matches!(lookup(routes, "USER.BASE.MORE"), Err(ApiError::MissingRoute(_))));
    }

    #[test]
    fn table_loads_from_json() {
        let routes: RouteTable = serde_json::from_str(
            r#"{"USER":{"BASE":"/","DEVICES":["/devices","/devices/current"]},"PING":"/ping"}"#,
        )
        .unwrap();
        let prefixed = prefix(&routes, "/v2");
        assert_eq!(lookup(&prefixed, "PING").unwrap(), "/v2/ping");
        assert_eq!(
            prefixed["USER"],
            Route::Group(table([
                ("BASE", Route::from("/v2/")),
                ("DEVICES", Route::from(vec!["/v2/devices", "/v2/devices/current"])),
            ]))
        );
    }
}
