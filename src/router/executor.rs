use super::error::MatchError;

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

pub type BoxError = Box<dyn StdError + Send + Sync>;

/// The terminal unit of a dispatch.
pub trait Executor<C>: Send + Sync {
    fn execute(&self, ctx: &mut C) -> Result<(), BoxError>;
}

impl<C, F> Executor<C> for F
where
    F: Fn(&mut C) -> Result<(), BoxError> + Send + Sync,
{
    fn execute(&self, ctx: &mut C) -> Result<(), BoxError> {
        (self)(ctx)
    }
}

/// Selects one executor of a leaf for the live request.
pub trait Inspector<C>: Send + Sync {
    fn inspect(&self, ctx: &C) -> Result<&dyn Executor<C>, MatchError>;

    /// The template path the inspector was compiled for.
    fn path(&self) -> &str;
}

/// A middleware receives the request context and the rest of the chain.
/// Calling [`Chain::proceed`] resumes at the next middleware; returning
/// without calling it ends the dispatch.
pub struct Middleware<C> {
    f: Arc<dyn Fn(&mut C, Chain<'_, C>) -> Result<(), BoxError> + Send + Sync>,
}

impl<C> Middleware<C> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut C, Chain<'_, C>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }
}

impl<C> Clone for Middleware<C> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

impl<C> fmt::Debug for Middleware<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Middleware")
    }
}

/// The continuation handed to a middleware.
///
/// A chain holds the middlewares that have not run yet. It is consumed by
/// `proceed`, so each chain value reaches the terminal executor at most once.
pub struct Chain<'a, C> {
    middlewares: &'a [&'a Middleware<C>],
    executor: &'a dyn Executor<C>,
}

impl<'a, C> Chain<'a, C> {
    pub fn proceed(self, ctx: &mut C) -> Result<(), BoxError> {
        match self.middlewares.split_first() {
            Some((m, rest)) => {
                let next = Chain {
                    middlewares: rest,
                    executor: self.executor,
                };
                (m.f)(ctx, next)
            }
            None => self.executor.execute(ctx),
        }
    }

    /// Number of middlewares left before the terminal executor.
    pub fn remaining(&self) -> usize {
        self.middlewares.len()
    }
}

/// The result of a successful match: the middlewares collected along the
/// matched branch, outermost first, and the executor chosen by the inspector.
pub struct MiddlewareExecutor<'s, C> {
    middlewares: SmallVec<[&'s Middleware<C>; 8]>,
    executor: &'s dyn Executor<C>,
    path: &'s str,
}

impl<'s, C> MiddlewareExecutor<'s, C> {
    pub fn execute(&self, ctx: &mut C) -> Result<(), BoxError> {
        let chain = Chain {
            middlewares: &self.middlewares,
            executor: self.executor,
        };
        chain.proceed(ctx)
    }

    /// The template path of the resolved leaf.
    pub fn path(&self) -> &'s str {
        self.path
    }

    pub fn middleware_count(&self) -> usize {
        self.middlewares.len()
    }
}

impl<C> fmt::Debug for MiddlewareExecutor<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareExecutor")
            .field("path", &self.path)
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}

/// A match in progress. Layers are pushed from the leaf upwards while the
/// recursion unwinds.
pub(super) struct Resolved<'s, C> {
    executor: &'s dyn Executor<C>,
    path: &'s str,
    layers: SmallVec<[&'s [Middleware<C>]; 4]>,
}

impl<'s, C> Resolved<'s, C> {
    pub(super) fn new(executor: &'s dyn Executor<C>, path: &'s str) -> Self {
        Self {
            executor,
            path,
            layers: SmallVec::new(),
        }
    }

    pub(super) fn pack(mut self, middlewares: &'s [Middleware<C>]) -> Self {
        if !middlewares.is_empty() {
            self.layers.push(middlewares);
        }
        self
    }

    pub(super) fn into_executor(self) -> MiddlewareExecutor<'s, C> {
        let middlewares = self
            .layers
            .iter()
            .rev()
            .flat_map(|layer| layer.iter())
            .collect();
        MiddlewareExecutor {
            middlewares,
            executor: self.executor,
            path: self.path,
        }
    }
}
