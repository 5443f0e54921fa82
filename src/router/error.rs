use super::RouterKind;

/// Errors raised while parsing templates or merging router trees.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("invalid path")]
    InvalidPath,

    #[error("unmatched braces in {path:?}")]
    UnmatchedPathBrace { path: String },

    #[error("regexp {0:?} does not have normative format")]
    InvalidRegexp(String),

    #[error("key {key:?} should be last element in the path")]
    InvalidPathKey { key: String },

    #[error("key {key:?} appears more than once in the path")]
    DuplicateKey { key: String },

    #[error("segment {0:?} has unmatched keys")]
    UnmatchedSegmentKeys(String),

    #[error(transparent)]
    Regex(#[from] regex::Error),

    #[error("router {kind} has no target")]
    EmptyRouterTarget { kind: RouterKind },

    #[error("router {kind} can not hold children")]
    InvalidParentRouter { kind: RouterKind },

    #[error("router kind {a} can not be merged with {b}")]
    UnmatchedRouterKind { a: RouterKind, b: RouterKind },

    #[error("router key {a:?} is not matched with {b:?}")]
    UnmatchedRouterKey { a: String, b: String },

    #[error("router regexp {a:?} is not matched with {b:?}")]
    UnmatchedRouterRegexp { a: String, b: String },

    #[error("there is no common prefix for {a:?} and {b:?}")]
    NoCommonPrefix { a: String, b: String },

    #[error("can't merge two routers that both have inspector at {target:?}")]
    ConflictInspectors { target: String },
}

/// Errors raised while matching a request path.
///
/// `NotFound` and `NoInspector` mean the path did not resolve at all; the
/// others are raised by an inspector that rejected the request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("can't find router")]
    NotFound,

    #[error("no inspector to generate executor")]
    NoInspector,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("unsupported media type")]
    UnsupportedMediaType,

    #[error("not acceptable")]
    NotAcceptable,

    #[error("invalid content type {0:?}")]
    InvalidContentType(String),

    #[error("invalid accept type {0:?}")]
    InvalidAcceptType(String),
}

impl MatchError {
    /// Returns `true` if no node owned the path.
    pub fn is_unmatched(&self) -> bool {
        matches!(self, Self::NotFound | Self::NoInspector)
    }

    #[cfg(feature = "http-router")]
    pub fn status(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Self::NotFound | Self::NoInspector => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            Self::InvalidContentType(_) | Self::InvalidAcceptType(_) => StatusCode::BAD_REQUEST,
        }
    }
}
