mod captures;
mod core;
mod endpoint;
mod error;
mod executor;
mod imp;
mod parse;

pub use self::captures::{Captures, Container};
pub use self::error::{MatchError, RouterError};
pub use self::executor::{BoxError, Chain, Executor, Inspector, Middleware, MiddlewareExecutor};
pub use self::parse::{reorganize, split, Segment, SegmentKind};

use self::endpoint::Endpoint;
use crate::charmap::CharMap;

use std::fmt;

use regex::Regex;

/// A node of the routing tree.
///
/// A tree is built from path templates with [`Router::parse`] and composed
/// with [`Router::merge`]. Every node may carry middlewares and an
/// [`Inspector`]; a request resolves to the inspector of the node that
/// consumed the last byte of its path.
pub struct Router<C> {
    kind: NodeKind,
    endpoint: Endpoint<C>,
    progeny: Progeny<C>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouterKind {
    /// Literal prefix.
    String,
    /// Compiled pattern over one path segment.
    Regexp,
    /// A single unconstrained capture of one path segment.
    FullMatchRegexp,
    /// Captures the rest of the path.
    Path,
}

impl fmt::Display for RouterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::String => "String",
            Self::Regexp => "Regexp",
            Self::FullMatchRegexp => "FullMatchRegexp",
            Self::Path => "Path",
        };
        f.write_str(s)
    }
}

#[derive(Debug)]
enum NodeKind {
    String(Box<str>),
    Regexp(Pattern),
    FullMatchRegexp(Box<str>),
    Path(Box<str>),
}

#[derive(Debug)]
struct Pattern {
    exp: Box<str>,
    regex: Regex,
    indices: Vec<(Box<str>, usize)>,
}

struct Progeny<C> {
    strings: CharMap<Router<C>>,
    regexps: Vec<Router<C>>,
    path: Option<Box<Router<C>>>,
}

impl<C> Default for Progeny<C> {
    fn default() -> Self {
        Self {
            strings: CharMap::new(),
            regexps: Vec::new(),
            path: None,
        }
    }
}

impl<C> fmt::Debug for Router<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("kind", &self.kind())
            .field("target", &self.target())
            .field("endpoint", &self.endpoint)
            .field("children", &self.children().collect::<Vec<_>>())
            .finish()
    }
}
