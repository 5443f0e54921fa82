use super::context::RequestContext;
use super::HttpMiddleware;
use crate::router::{BoxError, Executor};

use std::fmt;
use std::sync::Arc;

use http::{Method, StatusCode};

pub type Handler = Arc<dyn Executor<RequestContext>>;

/// What a definition does to its resource. Each operation implies an HTTP
/// method and the status a successful call answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Patch,
    Delete,
    AsyncCreate,
    AsyncUpdate,
    AsyncPatch,
    AsyncDelete,
    /// Matches every method.
    Any,
}

impl Operation {
    /// `None` for [`Operation::Any`].
    pub fn method(self) -> Option<Method> {
        let method = match self {
            Self::List | Self::Get => Method::GET,
            Self::Create | Self::AsyncCreate => Method::POST,
            Self::Update | Self::AsyncUpdate => Method::PUT,
            Self::Patch | Self::AsyncPatch => Method::PATCH,
            Self::Delete | Self::AsyncDelete => Method::DELETE,
            Self::Any => return None,
        };
        Some(method)
    }

    pub fn status(self) -> StatusCode {
        match self {
            Self::Create => StatusCode::CREATED,
            Self::Delete => StatusCode::NO_CONTENT,
            Self::AsyncCreate | Self::AsyncUpdate | Self::AsyncPatch | Self::AsyncDelete => {
                StatusCode::ACCEPTED
            }
            Self::List | Self::Get | Self::Update | Self::Patch | Self::Any => StatusCode::OK,
        }
    }
}

/// One handler at a path with its content-type contract.
///
/// `consumes` and `produces` left as `None` are inherited from the
/// enclosing [`Descriptor`].
#[derive(Clone, Default)]
pub struct Definition {
    pub operation: Option<Operation>,
    pub consumes: Option<Vec<String>>,
    pub produces: Option<Vec<String>>,
    pub handler: Option<Handler>,
}

impl Definition {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation: Some(operation),
            ..Self::default()
        }
    }

    pub fn consumes<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.consumes = Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn produces<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.produces = Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut RequestContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(f));
        self
    }

    pub(super) fn inherit(&mut self, consumes: Option<&Vec<String>>, produces: Option<&Vec<String>>) {
        if self.consumes.is_none() {
            self.consumes = consumes.cloned();
        }
        if self.produces.is_none() {
            self.produces = produces.cloned();
        }
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("operation", &self.operation)
            .field("consumes", &self.consumes)
            .field("produces", &self.produces)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// A declarative route tree.
///
/// Paths of children are joined onto their parent's path. Content types set
/// on a descriptor apply to every definition below it that does not set its
/// own.
#[derive(Debug, Clone, Default)]
pub struct Descriptor {
    pub path: String,
    pub consumes: Option<Vec<String>>,
    pub produces: Option<Vec<String>>,
    pub middlewares: Vec<HttpMiddleware>,
    pub definitions: Vec<Definition>,
    pub children: Vec<Descriptor>,
}

impl Descriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn consumes<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.consumes = Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn produces<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.produces = Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn middleware(mut self, middleware: HttpMiddleware) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn definition(mut self, definition: Definition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn child(mut self, child: Descriptor) -> Self {
        self.children.push(child);
        self
    }
}
