use rest_router::http_router;
use rest_router::http_router::{Definition, Descriptor, HttpMiddleware, Operation, MIME_JSON, MIME_TEXT};

use std::convert::Infallible as Never;

use hyper::service::make_service_fn;
use serde_json::json;

fn files() -> Descriptor {
    Descriptor::new("/api/v1")
        .produces(vec![MIME_JSON, MIME_TEXT])
        .middleware(HttpMiddleware::new(|ctx, chain| {
            tracing::info!(method = %ctx.method(), path = ctx.path(), "api request");
            chain.proceed(ctx)
        }))
        .child(
            Descriptor::new("/file/{filepath:*}").definition(
                Definition::new(Operation::Get).handler(|ctx| {
                    let path = ctx.params().get("filepath").unwrap_or_default().to_owned();
                    ctx.reply(&json!({ "access": path }))
                }),
            ),
        )
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut router = http_router! {
        GET "/hello/{name}" => |ctx| {
            let name = ctx.params().get("name").unwrap_or_default().to_owned();
            ctx.reply(&format!("hello, {}!", name))
        },
        POST "/echo" => |ctx| {
            let value: serde_json::Value = ctx.consume()?;
            ctx.reply(&value)
        },
    };
    router.add_descriptor(files());

    let service = match router.into_service() {
        Ok(service) => service,
        Err(e) => {
            tracing::error!(error = %e, "failed to build router");
            return;
        }
    };

    let make = make_service_fn(move |_| {
        let service = service.clone();
        async move { Ok::<_, Never>(service) }
    });

    let addr = ([127, 0, 0, 1], 3000).into();
    let server = hyper::Server::bind(&addr).serve(make);

    println!("Server is listening on: http://{}", addr);
    println!("hello: http://{}/hello/world", addr);
    println!("api: http://{}/api/v1/file/path/to/public/file", addr);
    println!("echo: curl -d '{{\"a\":1}}' -H 'content-type: application/json' http://{}/echo", addr);
    println!();

    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }
}
