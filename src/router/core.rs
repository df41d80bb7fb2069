//! Router core module - hot path for request routing.
//!
//! Templates are split into segments once at insertion; matching walks the
//! table in insertion order and never allocates for routes with at most
//! [`MAX_INLINE_PARAMS`] placeholders.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use http::Method;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Path parameters in template order. Names are shared with the route table;
/// values are percent-decoded request data.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(Box<str>),
    /// Placeholder; the name has its braces stripped
    Param(Arc<str>),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if raw.contains('{') {
            let name = raw.trim_start_matches('{').trim_end_matches('}');
            Segment::Param(Arc::from(name))
        } else {
            Segment::Literal(Box::from(raw))
        }
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    method: Method,
    template: String,
    segments: Vec<Segment>,
    value: T,
}

/// Result of matching a request against the table.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a, T> {
    pub value: &'a T,
    /// The template that matched, e.g. `/pets/{id}`
    pub template: &'a str,
    pub path_params: ParamVec,
}

impl<T> RouteMatch<'_, T> {
    /// Get a path parameter by name. The last occurrence wins when a template
    /// repeats a name.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Segment-based route table.
///
/// A request matches an entry when the method is equal, the number of
/// non-empty segments is equal, and every literal segment is equal. A
/// template segment containing `{` matches any request segment. The first
/// matching entry in insertion order wins; there is no specificity ranking,
/// so register literal routes before overlapping parameterized ones.
///
/// ```rust
/// use http::Method;
/// use typeroute::router::Router;
///
/// let mut router = Router::new();
/// router.insert(Method::GET, "/pets/mine", "mine");
/// router.insert(Method::GET, "/pets/{id}", "by_id");
///
/// let m = router.match_route(&Method::GET, "/pets/42/").unwrap();
/// assert_eq!(*m.value, "by_id");
/// assert_eq!(m.get_path_param("id"), Some("42"));
/// ```
#[derive(Debug, Clone)]
pub struct Router<T> {
    entries: Vec<Entry<T>>,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry. Earlier entries take precedence.
    pub fn insert(&mut self, method: Method, template: &str, value: T) {
        let segments: Vec<Segment> = split_segments(template).map(Segment::parse).collect();
        debug!(
            method = %method,
            template = %template,
            segments = segments.len(),
            position = self.entries.len(),
            "Route registered"
        );
        self.entries.push(Entry {
            method,
            template: template.to_string(),
            segments,
            value,
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|e| &e.value)
    }

    /// `(method, template)` pairs in insertion order.
    pub fn patterns(&self) -> impl Iterator<Item = (&Method, &str)> {
        self.entries.iter().map(|e| (&e.method, e.template.as_str()))
    }

    /// Find the first entry matching `method` and `path`.
    ///
    /// `path` must not carry a query string. Leading, trailing and repeated
    /// slashes are ignored.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        let request: SmallVec<[&str; 16]> = split_segments(path).collect();

        for entry in &self.entries {
            if entry.method != *method || entry.segments.len() != request.len() {
                continue;
            }
            let literals_match = entry.segments.iter().zip(&request).all(|(seg, req)| match seg {
                Segment::Literal(lit) => lit.as_ref() == *req,
                Segment::Param(_) => true,
            });
            if !literals_match {
                continue;
            }

            let path_params: ParamVec = entry
                .segments
                .iter()
                .zip(&request)
                .filter_map(|(seg, req)| match seg {
                    Segment::Param(name) => Some((Arc::clone(name), decode_segment(req))),
                    Segment::Literal(_) => None,
                })
                .collect();

            info!(
                method = %method,
                path = %path,
                route_pattern = %entry.template,
                path_params = ?path_params,
                "Route matched"
            );
            return Some(RouteMatch {
                value: &entry.value,
                template: &entry.template,
                path_params,
            });
        }

        debug!(
            method = %method,
            path = %path,
            candidates = self.entries.len(),
            "No route matched"
        );
        None
    }
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn decode_segment(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(Cow::Borrowed(s)) => s.to_owned(),
        Ok(Cow::Owned(s)) => s,
        Err(_) => raw.to_owned(),
    }
}
