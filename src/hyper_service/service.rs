use super::{BoxFuture, Request, Response};
use crate::http_router::{HttpRouter, RestRouter};
use crate::router::BoxError;

use std::sync::Arc;
use std::task::{Context, Poll};

use hyper::service::Service;
use hyper::Body;

/// Serves a [`RestRouter`] with hyper. Cloning shares the router.
#[derive(Debug, Clone)]
pub struct RouterService {
    router: Arc<RestRouter>,
}

impl Service<Request> for RouterService {
    type Response = Response;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Response, BoxError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let router = Arc::clone(&self.router);
        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body = match hyper::body::to_bytes(body).await {
                Ok(bytes) => bytes.to_vec(),
                Err(e) => {
                    tracing::error!(error = %e, "failed to read request body");
                    return Err(Box::new(e) as BoxError);
                }
            };
            let resp = router.dispatch(hyper::Request::from_parts(parts, body));
            Ok(resp.map(Body::from))
        })
    }
}

impl RouterService {
    pub fn new(router: RestRouter) -> Self {
        Self::from_arc(Arc::new(router))
    }

    pub fn from_arc(router: Arc<RestRouter>) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &RestRouter {
        &self.router
    }
}

impl HttpRouter {
    /// Builds the router and wraps it into a service.
    pub fn into_service(self) -> Result<RouterService, crate::http_router::BuildError> {
        self.build().map(RouterService::new)
    }
}
