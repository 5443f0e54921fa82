#![cfg(feature = "hyper-service")]

use rest_router::http_router;
use rest_router::hyper_service::RouterService;

use hyper::service::Service;
use hyper::{Body, Method, Request, StatusCode};
use serde_json::{json, Value};

fn service() -> RouterService {
    let router = http_router! {
        GET "/hello/{name}" => |ctx| {
            let greeting = format!("hello, {}!", ctx.params().get("name").unwrap_or_default());
            ctx.reply(&greeting)
        },
        POST "/files/{path:*}" => |ctx| {
            let mut body: Value = ctx.consume()?;
            body["path"] = json!(ctx.params().get("path"));
            ctx.reply(&body)
        },
    };
    router.into_service().unwrap()
}

async fn call(service: &mut RouterService, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = service.call(req).await.unwrap();
    let status = resp.status();
    let body = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn serves_requests() {
    let mut service = service();

    let req = Request::get("/hello/world").body(Body::empty()).unwrap();
    let (status, body) = call(&mut service, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, br#""hello, world!""#);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/files/a/b.txt")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"size": 3}"#))
        .unwrap();
    let (status, body) = call(&mut service, req).await;
    assert_eq!(status, StatusCode::CREATED);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({ "size": 3, "path": "a/b.txt" }));

    let req = Request::get("/hello/").body(Body::empty()).unwrap();
    let (status, _) = call(&mut service, req).await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);

    let req = Request::get("/missing").body(Body::empty()).unwrap();
    let (status, body) = call(&mut service, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, b"can't find router");
}

#[tokio::test]
async fn clones_share_the_router() {
    let service = service();
    let mut clone = service.clone();
    assert!(std::ptr::eq(service.router(), clone.router()));

    let req = Request::get("/hello/ferris").body(Body::empty()).unwrap();
    let (status, _) = call(&mut clone, req).await;
    assert_eq!(status, StatusCode::OK);
}
