#![cfg(feature = "http-router")]

use rest_router::http_router;
use rest_router::http_router::{
    BuildError, Definition, Descriptor, HttpMiddleware, HttpRouter, Operation, RestRouter,
    ServiceConfig, MIME_JSON, MIME_TEXT,
};
use rest_router::RouterError;

use http::header::{HeaderValue, CONTENT_TYPE, LOCATION};
use http::{Method, Request, Response, StatusCode};
use serde_json::{json, Value};

fn request(method: Method, uri: &str, headers: &[(&str, &str)], body: &[u8]) -> Request<Vec<u8>> {
    let mut builder = Request::builder().method(method).uri(uri);
    for &(k, v) in headers {
        builder = builder.header(k, v);
    }
    builder.body(body.to_vec()).unwrap()
}

fn get(router: &RestRouter, uri: &str, headers: &[(&str, &str)]) -> Response<Vec<u8>> {
    router.dispatch(request(Method::GET, uri, headers, b""))
}

fn content_type(resp: &Response<Vec<u8>>) -> Option<&str> {
    resp.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
}

fn body_json(resp: &Response<Vec<u8>>) -> Value {
    serde_json::from_slice(resp.body()).unwrap()
}

#[test]
fn dispatch_json_round() {
    let api = Descriptor::new("/api/v1")
        .consumes(vec![MIME_JSON])
        .produces(vec![MIME_JSON])
        .child(
            Descriptor::new("/{target1}/{target2}").definition(
                Definition::new(Operation::Create).handler(|ctx| {
                    let input: Value = ctx.consume()?;
                    let reply = json!({
                        "route": ctx.route_path(),
                        "target1": ctx.params().get("target1"),
                        "target2": ctx.params().get("target2"),
                        "name": input["name"],
                    });
                    ctx.reply(&reply)
                }),
            ),
        );

    let mut router = HttpRouter::new();
    router.add_descriptor(api);
    let router = router.build().unwrap();

    let resp = router.dispatch(request(
        Method::POST,
        "/api/v1/users/42",
        &[("content-type", "application/json; charset=utf-8")],
        br#"{"name": "ferris"}"#,
    ));
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(content_type(&resp), Some(MIME_JSON));
    assert_eq!(
        body_json(&resp),
        json!({
            "route": "/api/v1/{target1}/{target2}",
            "target1": "users",
            "target2": "42",
            "name": "ferris",
        })
    );

    let resp = router.dispatch(request(
        Method::POST,
        "/api/v1/users/42",
        &[("content-type", "application/json")],
        b"{not json",
    ));
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.body().as_slice(), b"internal server error");
}

fn negotiating_router() -> RestRouter {
    let items = Descriptor::new("/items")
        .definition(
            Definition::new(Operation::Get)
                .produces(vec![MIME_JSON])
                .handler(|ctx| ctx.reply(&"json")),
        )
        .definition(
            Definition::new(Operation::Get)
                .produces(vec![MIME_TEXT])
                .handler(|ctx| ctx.reply(&"text")),
        )
        .definition(
            Definition::new(Operation::Create)
                .consumes(vec![MIME_JSON])
                .produces(vec![MIME_JSON])
                .handler(|ctx| ctx.reply(&"created")),
        );

    let mut router = HttpRouter::new();
    router.add_descriptor(items);
    router.build().unwrap()
}

#[test]
fn dispatch_accept_negotiation() {
    let router = negotiating_router();

    let cases: &[(Option<&str>, StatusCode, &[u8])] = &[
        (None, StatusCode::OK, b"\"json\""),
        (Some("text/plain"), StatusCode::OK, b"text"),
        (Some("text/*"), StatusCode::OK, b"text"),
        (Some("*/*"), StatusCode::OK, b"\"json\""),
        (Some("text/plain;q=0.5, application/json"), StatusCode::OK, b"\"json\""),
        // The first definition producing any accepted type wins.
        (Some("application/json;q=0.2, text/plain;q=0.9"), StatusCode::OK, b"\"json\""),
        (Some("application/xml, */*;q=0.1"), StatusCode::OK, b"\"json\""),
        (Some("application/xml"), StatusCode::NOT_ACCEPTABLE, b"not acceptable"),
        (Some("text/plain;q=0"), StatusCode::NOT_ACCEPTABLE, b"not acceptable"),
    ];
    for &(accept, status, body) in cases {
        let headers: Vec<(&str, &str)> = accept.into_iter().map(|a| ("accept", a)).collect();
        let resp = get(&router, "/items", &headers);
        assert_eq!(resp.status(), status, "{:?}", accept);
        assert_eq!(resp.body().as_slice(), body, "{:?}", accept);
    }

    for &bad in &["application/json;q=x", "application/json;q=2", "json"] {
        let resp = get(&router, "/items", &[("accept", bad)]);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", bad);
    }

    let resp = get(&router, "/items", &[("accept", "text/plain")]);
    assert_eq!(content_type(&resp), Some(MIME_TEXT));
}

#[test]
fn dispatch_method_and_content_type() {
    let router = negotiating_router();

    let resp = router.dispatch(request(Method::PUT, "/items", &[], b""));
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let resp = router.dispatch(request(Method::POST, "/items", &[], b"{}"));
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let resp = router.dispatch(request(
        Method::POST,
        "/items",
        &[("content-type", "text/plain")],
        b"{}",
    ));
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let resp = router.dispatch(request(Method::POST, "/items", &[("content-type", "bad")], b"{}"));
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = router.dispatch(request(
        Method::POST,
        "/items",
        &[("content-type", "Application/JSON")],
        b"{}",
    ));
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body_json(&resp), json!("created"));

    // Bodiless methods skip the content type check.
    let resp = get(&router, "/items", &[("content-type", "bad")]);
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = get(&router, "/nothing", &[]);
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(content_type(&resp), Some(MIME_TEXT));
}

#[test]
fn build_detects_conflicts() {
    let handler = |ctx: &mut http_router::RequestContext| ctx.reply(&());

    let mut router = HttpRouter::new();
    router.add_descriptor(
        Descriptor::new("/items")
            .produces(vec![MIME_JSON, MIME_TEXT])
            .definition(Definition::new(Operation::Get).handler(handler))
            .definition(Definition::new(Operation::List).produces(vec![MIME_TEXT]).handler(handler)),
    );
    match router.build() {
        Err(BuildError::DefinitionConflict {
            consume,
            produce,
            method,
            path,
        }) => {
            assert_eq!(consume, "*/*");
            assert_eq!(produce, MIME_TEXT);
            assert_eq!(method, "GET");
            assert_eq!(path, "/items");
        }
        other => panic!("{:?}", other),
    }

    // Definitions in different method buckets never conflict.
    let mut router = HttpRouter::new();
    router.add_descriptor(
        Descriptor::new("/items")
            .consumes(vec![MIME_JSON])
            .produces(vec![MIME_JSON])
            .definition(Definition::new(Operation::Update).handler(handler))
            .definition(Definition::new(Operation::Create).handler(handler))
            .definition(Definition::new(Operation::Any).handler(handler)),
    );
    assert!(router.build().is_ok());
}

#[test]
fn build_reports_invalid_definitions() {
    fn build(d: Definition) -> Result<RestRouter, BuildError> {
        let mut router = HttpRouter::new();
        router.add_descriptor(Descriptor::new("/d").definition(d));
        router.build()
    }
    let ok = |ctx: &mut http_router::RequestContext| ctx.reply(&());

    match HttpRouter::new().build() {
        Err(BuildError::NoRouter) => {}
        other => panic!("{:?}", other),
    }
    match build(Definition::default().produces(vec![MIME_JSON]).handler(ok)) {
        Err(BuildError::DefinitionNoMethod { path }) => assert_eq!(path, "/d"),
        other => panic!("{:?}", other),
    }
    match build(Definition::new(Operation::Get).produces(vec![MIME_JSON])) {
        Err(BuildError::DefinitionNoFunction { method, .. }) => assert_eq!(method, "GET"),
        other => panic!("{:?}", other),
    }
    match build(Definition::new(Operation::Create).produces(vec![MIME_JSON]).handler(ok)) {
        Err(BuildError::DefinitionNoConsumes { method, .. }) => assert_eq!(method, "POST"),
        other => panic!("{:?}", other),
    }
    match build(Definition::new(Operation::Any).produces(vec![MIME_JSON]).handler(ok)) {
        Err(BuildError::DefinitionNoConsumes { method, .. }) => assert_eq!(method, "ANY"),
        other => panic!("{:?}", other),
    }
    match build(Definition::new(Operation::Get).handler(ok)) {
        Err(BuildError::DefinitionNoProduces { .. }) => {}
        other => panic!("{:?}", other),
    }
    match build(
        Definition::new(Operation::Create)
            .consumes(vec!["application/xml"])
            .produces(vec![MIME_JSON])
            .handler(ok),
    ) {
        Err(BuildError::DefinitionNoConsumer { content_type, .. }) => {
            assert_eq!(content_type, "application/xml")
        }
        other => panic!("{:?}", other),
    }
    match build(Definition::new(Operation::Get).produces(vec!["application/xml"]).handler(ok)) {
        Err(BuildError::DefinitionNoProducer { content_type, .. }) => {
            assert_eq!(content_type, "application/xml")
        }
        other => panic!("{:?}", other),
    }

    let mut router = HttpRouter::new();
    router.get("/a/{b", ok);
    match router.build() {
        Err(BuildError::Router {
            path,
            source: RouterError::UnmatchedPathBrace { .. },
        }) => assert_eq!(path, "/a/{b"),
        other => panic!("{:?}", other),
    }
}

#[test]
fn descriptor_inheritance() {
    let tree = Descriptor::new("/v2/")
        .consumes(vec![MIME_TEXT])
        .produces(vec![MIME_TEXT])
        .child(
            Descriptor::new("echo").definition(Definition::new(Operation::Create).handler(|ctx| {
                let text: String = ctx.consume()?;
                ctx.reply(&text)
            })),
        )
        .child(
            Descriptor::new("/json/").produces(vec![MIME_JSON]).definition(
                Definition::new(Operation::Update).handler(|ctx| {
                    let text: String = ctx.consume()?;
                    ctx.reply(&json!({ "text": text }))
                }),
            ),
        );

    let mut router = HttpRouter::new();
    router.add_descriptor(tree);
    let router = router.build().unwrap();

    let resp = router.dispatch(request(
        Method::POST,
        "/v2/echo",
        &[("content-type", "text/plain")],
        b"hello",
    ));
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(content_type(&resp), Some(MIME_TEXT));
    assert_eq!(resp.body().as_slice(), b"hello");

    let resp = router.dispatch(request(
        Method::PUT,
        "/v2/json",
        &[("content-type", "text/plain")],
        b"hi",
    ));
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(&resp), json!({ "text": "hi" }));

    let resp = router.dispatch(request(
        Method::PUT,
        "/v2/json",
        &[("content-type", "application/json")],
        b"\"hi\"",
    ));
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[test]
fn macro_with_middlewares() {
    let mut router = http_router! {
        GET "/users/{id}" => |ctx| {
            let id: u32 = match ctx.params().parse("id") {
                Some(Ok(id)) => id,
                _ => return Err("invalid id".into()),
            };
            ctx.reply(&json!({ "id": id }))
        },
        @ "/admin" => http_router! {
            DELETE "/users/{id}" => |_| Ok(()),
            ANY "/echo" => |ctx| {
                let method = ctx.method().to_string();
                ctx.reply(&method)
            },
        },
    };
    router.middleware(
        "/admin",
        HttpMiddleware::new(|ctx, chain| {
            if ctx.headers().contains_key("x-token") {
                return chain.proceed(ctx);
            }
            ctx.set_status(StatusCode::UNAUTHORIZED);
            ctx.write_body(HeaderValue::from_static(MIME_TEXT), b"token required".to_vec());
            Ok(())
        }),
    );
    let router = router.build().unwrap();

    let resp = get(&router, "/users/7", &[]);
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(&resp), json!({ "id": 7 }));

    let resp = get(&router, "/users/x", &[]);
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let resp = router.dispatch(request(
        Method::DELETE,
        "/admin/users/7",
        &[("content-type", MIME_JSON)],
        b"",
    ));
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body().as_slice(), b"token required");

    let resp = router.dispatch(request(
        Method::DELETE,
        "/admin/users/7",
        &[("x-token", "t"), ("content-type", MIME_JSON)],
        b"",
    ));
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(resp.body().is_empty());

    let resp = router.dispatch(request(
        Method::PATCH,
        "/admin/echo",
        &[("x-token", "t"), ("content-type", MIME_JSON)],
        b"",
    ));
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(&resp), json!("PATCH"));

    // The middleware-only prefix has no route of its own.
    let resp = get(&router, "/admin", &[("x-token", "t")]);
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[test]
fn nested_routers() {
    let mut router = HttpRouter::new();
    router
        .get("/", |ctx| ctx.reply(&"root"))
        .nest("/api/", |api| {
            api.get("/v1/status", |ctx| ctx.reply(&"ok"));
            api.get("/", |ctx| {
                let route = ctx.route_path().map(str::to_owned);
                ctx.reply(&route)
            });
            api.nest("v2", |v2| {
                v2.get("/status", |ctx| {
                    let route = ctx.route_path().map(str::to_owned);
                    ctx.reply(&route)
                });
            });
        });
    let router = router.build().unwrap();

    assert_eq!(body_json(&get(&router, "/", &[])), json!("root"));
    assert_eq!(body_json(&get(&router, "/api/v1/status", &[])), json!("ok"));
    assert_eq!(
        body_json(&get(&router, "/api/v2/status", &[])),
        json!("/api/v2/status")
    );

    // A sub router's root is mounted at the prefix itself.
    let resp = get(&router, "/api", &[]);
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(&resp), json!("/api"));
}

#[test]
fn dispatch_outlet_in_accept_order() {
    let mut router = HttpRouter::new();
    router.add_descriptor(
        Descriptor::new("/report").definition(
            Definition::new(Operation::Get)
                .produces(vec![MIME_JSON, MIME_TEXT])
                .handler(|ctx| ctx.reply(&"report")),
        ),
    );
    let router = router.build().unwrap();

    let resp = get(
        &router,
        "/report",
        &[("accept", "application/json;q=0.2, text/plain;q=0.9")],
    );
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(content_type(&resp), Some(MIME_TEXT));
    assert_eq!(resp.body().as_slice(), b"report");

    let resp = get(&router, "/report", &[("accept", "application/json")]);
    assert_eq!(content_type(&resp), Some(MIME_JSON));
}

#[test]
fn dispatch_decodes_path() {
    let mut router = HttpRouter::new();
    router
        .get("/files/{name}", |ctx| {
            let name = ctx.params().get("name").map(str::to_owned);
            ctx.reply(&name)
        })
        .get("/users/me", |ctx| ctx.reply(&"me"));
    let router = router.build().unwrap();

    let resp = get(&router, "/files/a%20b.txt", &[]);
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(&resp), json!("a b.txt"));

    let resp = get(&router, "/users/%6De", &[]);
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(&resp), json!("me"));

    let resp = get(&router, "/files/%FF", &[]);
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn filters() {
    let build = |config: ServiceConfig| {
        let mut router = HttpRouter::with_config(config);
        router
            .get("/users/{id}", |ctx| ctx.reply(&"user"))
            .get("/*", |ctx| ctx.reply(&"star"));
        router.build().unwrap()
    };

    let router = build(ServiceConfig::default());
    let resp = get(&router, "/users/7/?full=1", &[]);
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        resp.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
        Some("/users/7?full=1")
    );
    let resp = get(&router, "/users/7//", &[]);
    assert_eq!(
        resp.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
        Some("/users/7")
    );
    let resp = get(&router, "*", &[]);
    assert_eq!(body_json(&resp), json!("star"));

    let router = build(ServiceConfig {
        redirect_trailing_slash: false,
        fill_leading_slash: false,
        ..ServiceConfig::default()
    });
    assert_eq!(get(&router, "/users/7/", &[]).status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&router, "*", &[]).status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&router, "/users/7", &[]).status(), StatusCode::OK);
}

#[test]
fn handler_errors() {
    let mut router = HttpRouter::new();
    router
        .get("/fail", |_| Err("boom".into()))
        .get("/conflict", |ctx| {
            ctx.set_status(StatusCode::CONFLICT);
            ctx.write_body(HeaderValue::from_static(MIME_TEXT), b"taken".to_vec());
            Err("already exists".into())
        });
    let router = router.build().unwrap();

    let resp = get(&router, "/fail", &[]);
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.body().as_slice(), b"internal server error");

    let resp = get(&router, "/conflict", &[]);
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(resp.body().as_slice(), b"taken");
}

#[test]
fn config_from_json() {
    let config: ServiceConfig = serde_json::from_str(
        r#"{"consumes": ["text/plain"], "produces": ["text/plain"], "fill_leading_slash": false}"#,
    )
    .unwrap();
    assert!(config.redirect_trailing_slash);
    assert!(!config.fill_leading_slash);

    let mut router = HttpRouter::with_config(config.clone());
    router.post("/echo", |ctx| {
        let text: String = ctx.consume()?;
        ctx.reply(&text.to_uppercase())
    });
    let router = router.build().unwrap();
    assert_eq!(router.config(), &config);

    let resp = router.dispatch(request(
        Method::POST,
        "/echo",
        &[("content-type", "text/plain"), ("accept", "text/plain")],
        b"shout",
    ));
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(resp.body().as_slice(), b"SHOUT");
    assert_eq!(content_type(&resp), Some(MIME_TEXT));
}
