//! Ordered route table for requests under the engine's base path.

use axum::http::Method;
use regex::Regex;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    FindThread,
    CreateComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    NotFound,
    /// The path has a known shape but no entry accepts this method.
    MethodNotAllowed,
    Matched(Endpoint, &'a str),
}

struct Route {
    method: Method,
    pattern: Regex,
    endpoint: Endpoint,
}

impl Route {
    fn new(method: Method, pattern: &str, endpoint: Endpoint) -> Self {
        Self {
            method,
            pattern: Regex::new(pattern).expect("valid route pattern"),
            endpoint,
        }
    }
}

static ROUTES: LazyLock<[Route; 2]> = LazyLock::new(|| {
    [
        Route::new(
            Method::GET,
            r"(?i)^/threads/(?P<id>[a-z0-9_-]+)$",
            Endpoint::FindThread,
        ),
        Route::new(
            Method::POST,
            r"(?i)^/threads/(?P<id>[a-z0-9_-]+)/comments$",
            Endpoint::CreateComment,
        ),
    ]
});

/// Match a path with the base prefix already stripped.
pub fn match_route<'a>(method: &Method, path: &'a str) -> RouteMatch<'a> {
    let mut shape_matched = false;

    for route in ROUTES.iter() {
        let Some(caps) = route.pattern.captures(path) else {
            continue;
        };
        if route.method == *method {
            let id = caps.name("id").map_or("", |m| m.as_str());
            return RouteMatch::Matched(route.endpoint, id);
        }
        shape_matched = true;
    }

    if shape_matched {
        RouteMatch::MethodNotAllowed
    } else {
        RouteMatch::NotFound
    }
}
