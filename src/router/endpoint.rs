use super::error::{MatchError, RouterError};
use super::executor::{Inspector, Middleware, Resolved};

use std::fmt;

/// The handler of a node: ordered middlewares plus an optional inspector.
pub(super) struct Endpoint<C> {
    pub(super) middlewares: Vec<Middleware<C>>,
    pub(super) inspector: Option<Box<dyn Inspector<C>>>,
}

impl<C> Default for Endpoint<C> {
    fn default() -> Self {
        Self {
            middlewares: Vec::new(),
            inspector: None,
        }
    }
}

impl<C> fmt::Debug for Endpoint<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("middlewares", &self.middlewares.len())
            .field("inspector", &self.inspector.as_ref().map(|i| i.path()))
            .finish()
    }
}

impl<C> Endpoint<C> {
    pub(super) fn resolve<'s>(&'s self, ctx: &C) -> Result<Resolved<'s, C>, MatchError> {
        let inspector = self.inspector.as_ref().ok_or(MatchError::NoInspector)?;
        let executor = inspector.inspect(ctx)?;
        Ok(Resolved::new(executor, inspector.path()).pack(&self.middlewares))
    }

    pub(super) fn merge(&mut self, other: Endpoint<C>, target: &str) -> Result<(), RouterError> {
        if self.inspector.is_some() && other.inspector.is_some() {
            return Err(RouterError::ConflictInspectors {
                target: target.to_owned(),
            });
        }
        if other.inspector.is_some() {
            self.inspector = other.inspector;
        }
        self.middlewares.extend(other.middlewares);
        Ok(())
    }
}
