/// Declares an [`HttpRouter`](crate::http_router::HttpRouter).
///
/// ```
/// use rest_router::http_router;
///
/// let router = http_router! {
///     GET "/users/{id}" => |ctx| {
///         let id = ctx.params().get("id").map(str::to_owned);
///         ctx.reply(&id)
///     },
///     @ "/admin" => http_router! {
///         DELETE "/users/{id}" => |_| Ok(())
///     }
/// };
/// assert!(router.build().is_ok());
/// ```
#[macro_export]
macro_rules! http_router {
    {@entry $router:expr, @, $prefix:expr, $sub_router:expr} => {
        $router.insert_router($prefix, $sub_router)
    };
    {@entry $router:expr, GET, $pattern:expr, $data:expr} => {
        $router.get($pattern, $data)
    };
    {@entry $router:expr, POST, $pattern:expr, $data:expr} => {
        $router.post($pattern, $data)
    };
    {@entry $router:expr, PUT, $pattern:expr, $data:expr} => {
        $router.put($pattern, $data)
    };
    {@entry $router:expr, PATCH, $pattern:expr, $data:expr} => {
        $router.patch($pattern, $data)
    };
    {@entry $router:expr, DELETE, $pattern:expr, $data:expr} => {
        $router.delete($pattern, $data)
    };
    {@entry $router:expr, ANY, $pattern:expr, $data:expr} => {
        $router.any($pattern, $data)
    };

    {$($method:tt $pattern:expr => $data:expr),+ $(,)?} => {{
        let mut __router = $crate::http_router::HttpRouter::new();
        $($crate::http_router!(@entry __router, $method, $pattern, $data);)+
        __router
    }};
}
