use super::captures::{Captures, Container};
use super::endpoint::Endpoint;
use super::error::{MatchError, RouterError};
use super::executor::{Inspector, Middleware, MiddlewareExecutor};
use super::parse::{parse_with, FULL_MATCH_TARGET};
use super::{NodeKind, Progeny, Router, RouterKind};

use std::borrow::Cow;

impl<C> Router<C> {
    pub(super) fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            endpoint: Endpoint::default(),
            progeny: Progeny::default(),
        }
    }

    /// Parses a template into a chain of nodes.
    pub fn parse(path: &str) -> Result<Self, RouterError> {
        parse_with(path, |_| {})
    }

    /// Parses a template, attaching `inspector` and `middlewares` to its leaf.
    pub fn parse_with(
        path: &str,
        middlewares: Vec<Middleware<C>>,
        inspector: Option<Box<dyn Inspector<C>>>,
    ) -> Result<Self, RouterError> {
        parse_with(path, move |leaf| {
            leaf.endpoint.middlewares = middlewares;
            leaf.endpoint.inspector = inspector;
        })
    }

    pub fn kind(&self) -> RouterKind {
        match self.kind {
            NodeKind::String(_) => RouterKind::String,
            NodeKind::Regexp(_) => RouterKind::Regexp,
            NodeKind::FullMatchRegexp(_) => RouterKind::FullMatchRegexp,
            NodeKind::Path(_) => RouterKind::Path,
        }
    }

    /// The literal prefix or pattern source of this node. A full-match
    /// capture renders as the pattern it stands for; a tail renders empty.
    pub fn target(&self) -> Cow<'_, str> {
        match &self.kind {
            NodeKind::String(prefix) => Cow::Borrowed(&**prefix),
            NodeKind::Regexp(pattern) => Cow::Borrowed(&*pattern.exp),
            NodeKind::FullMatchRegexp(key) => {
                Cow::Owned(format!("(?P<{}>{})", key, FULL_MATCH_TARGET))
            }
            NodeKind::Path(_) => Cow::Borrowed(""),
        }
    }

    /// Capture names bound by this node.
    pub fn keys(&self) -> Vec<&str> {
        match &self.kind {
            NodeKind::String(_) => Vec::new(),
            NodeKind::Regexp(pattern) => pattern.indices.iter().map(|(k, _)| &**k).collect(),
            NodeKind::FullMatchRegexp(key) | NodeKind::Path(key) => vec![&**key],
        }
    }

    pub fn add_middleware(&mut self, middleware: Middleware<C>) -> &mut Self {
        self.endpoint.middlewares.push(middleware);
        self
    }

    pub fn add_middlewares<I>(&mut self, middlewares: I) -> &mut Self
    where
        I: IntoIterator<Item = Middleware<C>>,
    {
        self.endpoint.middlewares.extend(middlewares);
        self
    }

    pub fn middlewares(&self) -> &[Middleware<C>] {
        &self.endpoint.middlewares
    }

    /// Replaces the inspector of this node, returning the previous one.
    pub fn set_inspector(
        &mut self,
        inspector: Box<dyn Inspector<C>>,
    ) -> Option<Box<dyn Inspector<C>>> {
        self.endpoint.inspector.replace(inspector)
    }

    pub fn inspector(&self) -> Option<&dyn Inspector<C>> {
        self.endpoint.inspector.as_deref()
    }

    /// Adds a child, merging it into an existing sibling of the same kind
    /// and target.
    pub fn add_router(&mut self, router: Router<C>) -> Result<&mut Self, RouterError> {
        if let NodeKind::Path(_) = self.kind {
            return Err(RouterError::InvalidParentRouter {
                kind: RouterKind::Path,
            });
        }
        self.progeny.add(router)?;
        Ok(self)
    }

    /// Merges `other` into this tree.
    ///
    /// Both roots must be of the same kind. String roots are split on their
    /// longest common prefix, other kinds must share their target. Merging is
    /// order independent for trees whose leaves do not collide.
    pub fn merge(&mut self, other: Router<C>) -> Result<&mut Self, RouterError> {
        self.merge_node(other)?;
        Ok(self)
    }

    pub fn children(&self) -> impl Iterator<Item = &Router<C>> {
        self.progeny.iter()
    }

    /// Matches `path`, writing captures into `c`.
    ///
    /// Captures are only written for the branch that finally matched.
    pub fn find_with<'s, 'p, K>(
        &'s self,
        ctx: &C,
        c: &mut K,
        path: &'p str,
    ) -> Result<MiddlewareExecutor<'s, C>, MatchError>
    where
        K: Container<'p> + ?Sized,
        's: 'p,
    {
        self.resolve(ctx, c, path).map(|r| r.into_executor())
    }

    pub fn find<'s, 'p>(
        &'s self,
        ctx: &C,
        path: &'p str,
    ) -> Result<(MiddlewareExecutor<'s, C>, Captures<'p>), MatchError>
    where
        's: 'p,
    {
        let mut captures = Captures::new();
        let executor = self.find_with(ctx, &mut captures, path)?;
        Ok((executor, captures))
    }
}
