use crate::router::RouterError;

/// Errors raised while compiling descriptors into a router.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no router is registered")]
    NoRouter,

    #[error("definition at {path:?} has no method")]
    DefinitionNoMethod { path: String },

    #[error("definition {method} at {path:?} has no function")]
    DefinitionNoFunction { method: String, path: String },

    #[error("definition {method} at {path:?} has no consumes")]
    DefinitionNoConsumes { method: String, path: String },

    #[error("definition {method} at {path:?} has no produces")]
    DefinitionNoProduces { method: String, path: String },

    #[error("no consumer for content type {content_type:?} at {path:?}")]
    DefinitionNoConsumer { content_type: String, path: String },

    #[error("no producer for content type {content_type:?} at {path:?}")]
    DefinitionNoProducer { content_type: String, path: String },

    #[error("consumer-producer pair {consume}:{produce} conflicts for {method} at {path:?}")]
    DefinitionConflict {
        consume: String,
        produce: String,
        method: String,
        path: String,
    },

    #[error("a consumer can not handle {content_type:?}")]
    InvalidConsumer { content_type: String },

    #[error("a producer can not handle {content_type:?}")]
    InvalidProducer { content_type: String },

    #[error("can't parse path {path:?}: {source}")]
    Router {
        path: String,
        #[source]
        source: RouterError,
    },
}
