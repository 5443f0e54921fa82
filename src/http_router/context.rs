use super::mime::{self, MIME_TEXT};
use super::params::Params;
use super::registry::{Consumer, Producer};
use crate::router::{BoxError, MatchError};

use std::fmt;
use std::sync::Arc;

use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use http::request::Parts;
use http::{Method, Request, Response, StatusCode, Uri};
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("no consumer is selected for this request")]
    NoConsumer,

    #[error("no producer is selected for this request")]
    NoProducer,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Request-scoped state of one dispatch.
///
/// It carries the request, the path parameters and route path found by the
/// router, the consumer and producer chosen by negotiation, and the response
/// being built.
pub struct RequestContext {
    parts: Parts,
    body: Vec<u8>,
    params: Params,
    route_path: Option<String>,
    consumer: Option<Arc<dyn Consumer>>,
    producer: Option<Arc<dyn Producer>>,
    response: Response<Vec<u8>>,
    written: bool,
}

impl RequestContext {
    pub fn new(req: Request<Vec<u8>>) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            parts,
            body,
            params: Params::default(),
            route_path: None,
            consumer: None,
            producer: None,
            response: Response::new(Vec::new()),
            written: false,
        }
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The template path of the route that matched.
    pub fn route_path(&self) -> Option<&str> {
        self.route_path.as_deref()
    }

    /// The media type of the request body.
    pub fn content_type(&self) -> Result<String, MatchError> {
        mime::content_type(&self.parts.headers)
    }

    /// Decodes the request body with the negotiated consumer.
    pub fn consume<T: DeserializeOwned>(&self) -> Result<T, BoxError> {
        let consumer = self.consumer.as_ref().ok_or(ContextError::NoConsumer)?;
        let value = consumer.consume(&self.body)?;
        Ok(serde_json::from_value(value).map_err(ContextError::from)?)
    }

    /// Encodes `value` with the negotiated producer as the response body.
    pub fn reply<T: Serialize>(&mut self, value: &T) -> Result<(), BoxError> {
        let producer = self.producer.as_ref().ok_or(ContextError::NoProducer)?;
        let value = serde_json::to_value(value).map_err(ContextError::from)?;

        let mut body = Vec::new();
        producer.produce(&value, &mut body)?;
        let content_type = HeaderValue::from_str(producer.content_type())?;

        self.response.headers_mut().insert(CONTENT_TYPE, content_type);
        *self.response.body_mut() = body;
        self.written = true;
        Ok(())
    }

    /// Sets a raw response body, bypassing the producer.
    pub fn write_body(&mut self, content_type: HeaderValue, body: Vec<u8>) {
        self.response.headers_mut().insert(CONTENT_TYPE, content_type);
        *self.response.body_mut() = body;
        self.written = true;
    }

    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn set_status(&mut self, status: StatusCode) {
        *self.response.status_mut() = status;
    }

    pub fn response_headers_mut(&mut self) -> &mut HeaderMap {
        self.response.headers_mut()
    }

    /// Whether a body has been written.
    pub fn is_written(&self) -> bool {
        self.written
    }

    pub fn into_response(self) -> Response<Vec<u8>> {
        self.response
    }
}

impl RequestContext {
    pub(super) fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    pub(super) fn set_route_path(&mut self, path: &str) {
        self.route_path = Some(path.to_owned());
    }

    pub(super) fn prepare(
        &mut self,
        status: StatusCode,
        consumer: Option<Arc<dyn Consumer>>,
        producer: Arc<dyn Producer>,
    ) {
        *self.response.status_mut() = status;
        self.consumer = consumer;
        self.producer = Some(producer);
    }

    /// Turns a rejected request into a short plain text response.
    pub(super) fn fail(&mut self, status: StatusCode, message: &str) {
        *self.response.status_mut() = status;
        self.write_body(
            HeaderValue::from_static(MIME_TEXT),
            message.as_bytes().to_vec(),
        );
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("method", &self.parts.method)
            .field("uri", &self.parts.uri)
            .field("params", &self.params)
            .field("route_path", &self.route_path)
            .field("status", &self.response.status())
            .finish()
    }
}
