//! Routing and chaining behaviour through the public API, without a socket.

use chain_router::routing::RouteOptions;
use chain_router::{handler, App, Ctx, Handler, MethodFilter};
use axum::body::Bytes;
use axum::http::{Method, Request, StatusCode};

fn dispatch(app: App, method: Method, uri: &str) -> (StatusCode, String) {
    let response = app.into_dispatcher().dispatch(
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::new())
            .unwrap(),
    );
    (
        response.status(),
        String::from_utf8(response.body().to_vec()).unwrap(),
    )
}

fn params_as_body() -> Handler {
    handler(|c: &mut Ctx| {
        let rendered = c
            .params()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        c.send(rendered);
        Ok(())
    })
}

#[test]
fn test_inner_wildcard_between_params() {
    let mut app = App::new();
    app.get("/prefix/:param/*/test", [params_as_body()]).unwrap();
    assert_eq!(
        dispatch(app, Method::GET, "/prefix/john/doe/test"),
        (StatusCode::OK, "param=john&*=doe".to_string())
    );
}

#[test]
fn test_optional_params() {
    for (uri, expected) in [
        ("/", "john=&doe="),
        ("/a", "john=a&doe="),
        ("/a/b", "john=a&doe=b"),
    ] {
        let mut app = App::new();
        app.get("/:john?/:doe?", [handler(|c| {
            let body = format!("john={}&doe={}", c.param("john"), c.param("doe"));
            c.send(body);
            Ok(())
        })])
        .unwrap();
        assert_eq!(dispatch(app, Method::GET, uri).1, expected, "uri {uri}");
    }
}

#[test]
fn test_optional_params_do_not_over_match() {
    let mut app = App::new();
    app.get("/:john?/:doe?", [params_as_body()]).unwrap();
    assert_eq!(dispatch(app, Method::GET, "/a/b/c").0, StatusCode::NOT_FOUND);
}

#[test]
fn test_trailing_wildcard() {
    let mut app = App::new();
    app.get("/static/*", [handler(|c| {
        let rest = c.param("*").to_string();
        c.send(rest);
        Ok(())
    })])
    .unwrap();
    assert_eq!(
        dispatch(app, Method::GET, "/static/css/site.css").1,
        "css/site.css"
    );
}

#[test]
fn test_use_matches_on_segment_boundaries() {
    let build = || {
        let mut app = App::new();
        app.middleware("/john", [handler(|c| {
            c.send("use");
            Ok(())
        })])
        .unwrap();
        app
    };
    assert_eq!(dispatch(build(), Method::GET, "/john").1, "use");
    assert_eq!(dispatch(build(), Method::PUT, "/john/doe").1, "use");
    assert_eq!(dispatch(build(), Method::GET, "/johnny").0, StatusCode::NOT_FOUND);
}

#[test]
fn test_every_method_helper_registers_its_method() {
    let mut app = App::new();
    let ok = || [handler(|c| {
        c.send(c.method().to_string());
        Ok(())
    })];
    app.get("/m", ok()).unwrap();
    app.head("/m", ok()).unwrap();
    app.post("/m", ok()).unwrap();
    app.put("/m", ok()).unwrap();
    app.delete("/m", ok()).unwrap();
    app.connect("/m", ok()).unwrap();
    app.options("/m", ok()).unwrap();
    app.trace("/m", ok()).unwrap();
    app.patch("/m", ok()).unwrap();

    let filters: Vec<String> = app.routes().iter().map(|r| r.filter().to_string()).collect();
    assert_eq!(
        filters,
        ["GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH"]
    );
    assert_eq!(dispatch(app, Method::PATCH, "/m").1, "PATCH");
}

#[test]
fn test_custom_method_via_register() {
    let mut app = App::new();
    let purge = Method::from_bytes(b"PURGE").unwrap();
    app.register(purge.clone(), "/cache", [handler(|c| {
        c.send("purged");
        Ok(())
    })])
    .unwrap();
    app.register(MethodFilter::All, "/cache", [handler(|c| {
        c.send("fallback");
        Ok(())
    })])
    .unwrap();

    let dispatcher = app.into_dispatcher();
    let run = |method: Method| {
        let response = dispatcher.dispatch(
            Request::builder()
                .method(method)
                .uri("/cache")
                .body(Bytes::new())
                .unwrap(),
        );
        String::from_utf8(response.body().to_vec()).unwrap()
    };
    assert_eq!(run(purge), "purged");
    assert_eq!(run(Method::GET), "fallback");
}

#[test]
fn test_nested_groups_with_middleware() {
    let mut app = App::new();
    {
        let mut v1 = app
            .group_with("/v1", [handler(|c| {
                c.write("v1>");
                c.next();
                Ok(())
            })])
            .unwrap();
        let mut admin = v1
            .group_with("/admin", [handler(|c| {
                c.write("admin>");
                c.next();
                Ok(())
            })])
            .unwrap();
        admin.get("/stats", [handler(|c| {
            c.write("stats");
            Ok(())
        })])
        .unwrap();
    }
    assert_eq!(dispatch(app, Method::GET, "/v1/admin/stats").1, "v1>admin>stats");
}

#[test]
fn test_matches_lists_the_whole_chain() {
    let mut app = App::new();
    app.middleware("/", Vec::<Handler>::new()).unwrap();
    app.get("/users/:id", [params_as_body()]).unwrap();
    app.all("/users/:name", [params_as_body()]).unwrap();
    app.post("/users/:id", [params_as_body()]).unwrap();
    let dispatcher = app.into_dispatcher();

    let chain: Vec<_> = dispatcher
        .matches(&Method::GET, "/users/7")
        .map(|m| (m.route.path().to_string(), m.params))
        .collect();
    assert_eq!(
        chain,
        vec![
            ("/".to_string(), vec![]),
            ("/users/:id".to_string(), vec![("id", "7")]),
            ("/users/:name".to_string(), vec![("name", "7")]),
        ]
    );
    assert_eq!(
        dispatcher.find(&Method::GET, "/users/7").unwrap().route.path(),
        "/"
    );
}

#[test]
fn test_strict_routing_distinguishes_trailing_slash() {
    let build = || {
        let mut app = App::with_options(RouteOptions {
            case_sensitive: false,
            strict_routing: true,
        });
        app.get("/dir/", [handler(|c| {
            c.send("dir");
            Ok(())
        })])
        .unwrap();
        app
    };
    assert_eq!(dispatch(build(), Method::GET, "/dir/").0, StatusCode::OK);
    assert_eq!(dispatch(build(), Method::GET, "/dir").0, StatusCode::NOT_FOUND);
}

#[test]
fn test_invalid_pattern_is_rejected() {
    let mut app = App::new();
    assert!(app.get("/users/:", [params_as_body()]).is_err());
    assert!(app.routes().is_empty());
}

#[test]
fn test_get_all_use_run_in_registration_order() {
    let mut app = App::new();
    app.get("/test", [handler(|c| {
        c.write("A");
        c.next();
        Ok(())
    })])
    .unwrap();
    app.all("/test", [handler(|c| {
        c.write("B");
        c.next();
        Ok(())
    })])
    .unwrap();
    app.middleware("/", [handler(|c| {
        c.write("C");
        Ok(())
    })])
    .unwrap();

    assert_eq!(
        dispatch(app, Method::GET, "/test"),
        (StatusCode::OK, "ABC".to_string())
    );
}

#[test]
fn test_use_wildcard_binds_remainder() {
    let mut app = App::new();
    app.middleware("/prefix/*", [handler(|c| {
        let rest = c.param("*").to_string();
        c.send(rest);
        Ok(())
    })])
    .unwrap();

    assert_eq!(
        dispatch(app, Method::GET, "/prefix/john/doe"),
        (StatusCode::OK, "john/doe".to_string())
    );
}
