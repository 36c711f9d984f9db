//! Route table, parameter extraction and handler wrapping.

mod common;

use std::sync::{Arc, Mutex};

use common::{fixture_paths, fixtures, Call, RecordingResponse};
use mvc_router::config::PathsConfig;
use mvc_router::dispatch::{action, handler::Next};
use mvc_router::http::RouteResponse;
use mvc_router::{
    AppHandle, Completion, DispatchError, ExecutionContext, ParamBag, RouteError, RouteMeta,
    RouteRequest, RouteTarget, Router,
};
use serde_json::{json, Map, Value};

fn meta_map(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn route_keys(router: &Router) -> Vec<(String, Map<String, Value>)> {
    router
        .routes()
        .into_iter()
        .map(|r| (r.pattern, r.meta.to_map()))
        .collect()
}

/// Error sink that keeps whatever reached `next`.
fn capture_next() -> (Next, Arc<Mutex<Vec<DispatchError>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (Next::new(move |err| sink.lock().unwrap().push(err)), seen)
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_route_with_shorthand() {
    let mut router = Router::default();
    let route = router.route("/users/:id", "users#show", None).unwrap();

    assert_eq!(route.pattern, "/users/:id");
    assert_eq!(route.meta.to_map(), meta_map(json!({"controller": "users", "action": "show"})));
}

#[test]
fn test_route_with_meta_map() {
    let mut router = Router::default();
    let route = router
        .route("/users/:id", meta_map(json!({"controller": "users", "action": "show"})), None)
        .unwrap();

    assert_eq!(route.meta.controller(), Some("users"));
    assert_eq!(route.meta.action(), Some("show"));
}

#[test]
fn test_route_with_redirect() {
    let mut router = Router::default();
    let route = router
        .route("/old", meta_map(json!({"redirect": "/new"})), None)
        .unwrap();

    assert_eq!(route.meta.target(), &RouteTarget::redirect("/new"));
    assert_eq!(route.meta.to_map(), meta_map(json!({"redirect": "/new"})));
}

#[test]
fn test_route_with_extra_meta() {
    let mut router = Router::default();
    let route = router
        .route("/admin", "admin#index", Some(meta_map(json!({"role": "admin"}))))
        .unwrap();

    assert_eq!(
        route.meta.to_map(),
        meta_map(json!({"controller": "admin", "action": "index", "role": "admin"}))
    );
}

#[test]
fn test_redirect_route_accepts_extra_meta() {
    let mut router = Router::default();
    let route = router
        .route("/old", RouteTarget::redirect("/new"), Some(meta_map(json!({"role": "admin"}))))
        .unwrap();

    assert_eq!(route.meta.redirect(), Some("/new"));
    assert_eq!(route.meta.get("role"), Some(json!("admin")));
}

#[test]
fn test_leading_slash_normalized() {
    let mut router = Router::default();
    let with_slash = router.route("/users/login", "users#login", None).unwrap();
    let without_slash = router.route("users/login", "users#login", None).unwrap();

    assert_eq!(with_slash.pattern, without_slash.pattern);
    assert_eq!(without_slash.pattern, "/users/login");
}

#[test]
fn test_rejects_invalid_targets() {
    let mut router = Router::default();

    let shorthand = router.route("/a", "no-separator", None).unwrap_err();
    let conflicting = router
        .route("/b", meta_map(json!({"controller": "a", "action": "b", "redirect": "/c"})), None)
        .unwrap_err();
    let missing = router
        .route("/c", meta_map(json!({"controller": "a"})), None)
        .unwrap_err();

    for err in [&shorthand, &conflicting, &missing] {
        assert!(matches!(err, RouteError::InvalidRoute { .. }), "{:?}", err);
    }
    assert!(router.is_empty());
}

// ============================================================================
// Route table snapshots
// ============================================================================

#[test]
fn test_routes_empty() {
    let router = Router::default();
    assert!(router.routes().is_empty());
    assert!(router.match_path("/anything").is_none());
}

#[test]
fn test_routes_snapshot_is_a_copy() {
    let mut router = Router::default();
    router.route("/users/login", "users#login", None).unwrap();
    router.route("/users/:id", "users#show", None).unwrap();
    let before = route_keys(&router);

    let mut snapshot = router.routes();
    snapshot[0].pattern = "/mutated".to_string();
    snapshot[0].meta = RouteMeta::new(RouteTarget::redirect("/elsewhere")).with("role", "root");
    snapshot.pop();
    snapshot.clear();

    assert_eq!(route_keys(&router), before);
}

// ============================================================================
// Building from the routes file
// ============================================================================

#[test]
fn test_build_routes_preserves_declaration_order() {
    let mut router = Router::new(fixture_paths());
    let count = router.build_routes().unwrap();

    assert_eq!(count, 3);
    assert_eq!(
        route_keys(&router),
        vec![
            (
                "/users/login".to_string(),
                meta_map(json!({"controller": "users", "action": "login"}))
            ),
            (
                "/users/:id".to_string(),
                meta_map(json!({"controller": "users", "action": "show"}))
            ),
            (
                "/test".to_string(),
                meta_map(json!({"controller": "test", "action": "index"}))
            ),
        ]
    );
}

#[test]
fn test_build_routes_missing_file_is_fatal() {
    let mut router = Router::new(PathsConfig::new(fixtures("does-not-exist")));
    let err = router.build_routes().unwrap_err();
    assert!(matches!(err, RouteError::Io { .. }), "{:?}", err);
}

#[test]
fn test_build_routes_malformed_file_is_fatal() {
    let mut router = Router::new(PathsConfig::new(fixtures("malformed")));
    let err = router.build_routes().unwrap_err();
    assert!(matches!(err, RouteError::Parse { .. }), "{:?}", err);
}

#[test]
fn test_build_routes_invalid_entry_is_fatal() {
    let mut router = Router::new(PathsConfig::new(fixtures("invalid")));
    let err = router.build_routes().unwrap_err();
    assert!(
        matches!(err, RouteError::InvalidRoute { ref pattern, .. } if pattern == "/broken"),
        "{:?}",
        err
    );
}

// ============================================================================
// Matching
// ============================================================================

#[test]
fn test_match_first_registered_wins() {
    let mut router = Router::new(fixture_paths());
    router.build_routes().unwrap();

    let login = router.match_path("users/login").unwrap();
    assert_eq!(login.pattern, "/users/login");
    assert_eq!(login.meta.action(), Some("login"));

    let show = router.match_path("users/thisisaparam").unwrap();
    assert_eq!(show.pattern, "/users/:id");
    assert_eq!(show.meta.action(), Some("show"));
}

#[test]
fn test_match_order_reversed() {
    let mut router = Router::default();
    router.route("/users/:id", "users#show", None).unwrap();
    router.route("/users/login", "users#login", None).unwrap();

    let found = router.match_path("/users/login").unwrap();
    assert_eq!(found.pattern, "/users/:id");
    assert_eq!(found.meta.action(), Some("show"));
}

#[test]
fn test_match_none() {
    let mut router = Router::new(fixture_paths());
    router.build_routes().unwrap();

    assert!(router.match_path("/nope").is_none());
    assert!(router.match_path("/users").is_none());
    assert!(router.match_path("/users/1/extra").is_none());
}

// ============================================================================
// Parameter extraction
// ============================================================================

#[test]
fn test_get_params_empty() {
    let router = Router::default();
    assert_eq!(router.get_params(&RouteRequest::new("/")), ParamBag::new());
}

#[test]
fn test_get_params_query_only() {
    let router = Router::default();
    let req = RouteRequest::new("/")
        .with_query("foo", "bar")
        .with_query("bam", "baz");

    let params = router.get_params(&req);
    assert_eq!(params.len(), 2);
    assert_eq!(params["foo"], "bar");
    assert_eq!(params["bam"], "baz");
}

#[test]
fn test_get_params_captures_only() {
    let router = Router::default();
    let req = RouteRequest::new("/")
        .with_route_keys(["id", "login"])
        .with_param("id", "id-value")
        .with_param("login", "login-value");

    let params = router.get_params(&req);
    assert_eq!(params.len(), 2);
    assert_eq!(params["id"], "id-value");
    assert_eq!(params["login"], "login-value");
}

#[test]
fn test_get_params_merges_query_and_captures() {
    let router = Router::default();
    let req = RouteRequest::new("/")
        .with_query("foo", "bar")
        .with_query("bam", "baz")
        .with_route_keys(["id", "login"])
        .with_param("id", "id-value")
        .with_param("login", "login-value");

    let expected: ParamBag = [
        ("foo", "bar"),
        ("bam", "baz"),
        ("id", "id-value"),
        ("login", "login-value"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    assert_eq!(router.get_params(&req), expected);
}

#[test]
fn test_get_params_ignores_unnamed_bound_params() {
    let router = Router::default();
    let req = RouteRequest::new("/")
        .with_route_keys(["id"])
        .with_param("id", "1")
        .with_param("session", "framework-state");

    let params = router.get_params(&req);
    assert_eq!(params.len(), 1);
    assert!(!params.contains_key("session"));
}

#[test]
fn test_get_params_sanitizes_every_value() {
    let router = Router::default();
    let xss = r#"<script>alert("foo")</script>"#;
    let cleaned = r#"[removed]alert&#40;"foo"&#41;[removed]"#;
    let req = RouteRequest::new("/")
        .with_query("q", xss)
        .with_route_keys(["id"])
        .with_param("id", xss);

    let params = router.get_params(&req);
    assert_eq!(params["q"], cleaned);
    assert_eq!(params["id"], cleaned);
}

// ============================================================================
// Handler wrapping
// ============================================================================

#[test]
fn test_handler_renders_with_locals_app_and_req() {
    let router = Router::default();
    let app = AppHandle::new("the app");
    let meta = RouteMeta::new(RouteTarget::controller("test", "index"));
    let handler = router.get_handler(
        action(|_ctx: ExecutionContext, _params: ParamBag, done: Completion| {
            done.render("template/path", json!({"some": "data"}));
        }),
        "/test",
        meta,
    );

    let recorder = Arc::new(RecordingResponse::default());
    let response: Arc<dyn RouteResponse> = recorder.clone();
    let req = RouteRequest::new("/test")
        .with_query("foo", "bar")
        .with_app(app.clone());
    let (next, errors) = capture_next();

    handler(req, response, next);

    let renders = recorder.renders();
    assert_eq!(renders.len(), 1);
    let (template, options) = &renders[0];
    assert_eq!(template, "template/path");
    assert_eq!(options.locals, json!({"some": "data"}));
    assert!(options.app.ptr_eq(&app));
    assert_eq!(options.req.path, "/test");
    assert_eq!(options.req.query.get("foo").map(String::as_str), Some("bar"));
    assert!(recorder.redirects().is_empty());
    assert!(errors.lock().unwrap().is_empty());
}

#[test]
fn test_handler_passes_params_and_context() {
    let router = Router::default();
    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let meta = RouteMeta::new(RouteTarget::controller("users", "show")).with("role", "admin");
    let handler = router.get_handler(
        action(move |ctx: ExecutionContext, params: ParamBag, done: Completion| {
            *sink.lock().unwrap() = Some((params, ctx.current_route().clone()));
            done.render("users/show", Value::Null);
        }),
        "/users/:id",
        meta.clone(),
    );

    let recorder = Arc::new(RecordingResponse::default());
    let req = RouteRequest::new("/users/42")
        .with_query("tab", "posts")
        .with_param("id", "42");
    handler(req, recorder.clone() as Arc<dyn RouteResponse>, Next::log());

    let (params, route) = seen.lock().unwrap().take().unwrap();
    assert_eq!(params["id"], "42");
    assert_eq!(params["tab"], "posts");
    assert_eq!(route, meta);
}

#[test]
fn test_redirect_to_path() {
    let router = Router::default();
    let handler = router.get_handler(
        action(|ctx: ExecutionContext, _params: ParamBag, _done: Completion| {
            ctx.redirect_to("/some_uri");
        }),
        "/test",
        RouteMeta::new(RouteTarget::controller("test", "index")),
    );

    let recorder = Arc::new(RecordingResponse::default());
    handler(RouteRequest::new("/test"), recorder.clone() as Arc<dyn RouteResponse>, Next::log());

    let calls = recorder.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(&calls[0], Call::Redirect(r) if r.status.is_none() && r.path == "/some_uri"));
}

#[test]
fn test_redirect_to_status_and_path() {
    let router = Router::default();
    let handler = router.get_handler(
        action(|ctx: ExecutionContext, _params: ParamBag, _done: Completion| {
            ctx.redirect_to((301, "/some_uri"));
        }),
        "/test",
        RouteMeta::new(RouteTarget::controller("test", "index")),
    );

    let recorder = Arc::new(RecordingResponse::default());
    handler(RouteRequest::new("/test"), recorder.clone() as Arc<dyn RouteResponse>, Next::log());

    let redirects = recorder.redirects();
    assert_eq!(redirects.len(), 1);
    assert_eq!(redirects[0].status, Some(301));
    assert_eq!(redirects[0].path, "/some_uri");
    assert!(recorder.renders().is_empty());
}

#[test]
fn test_action_error_goes_to_next() {
    let router = Router::default();
    let handler = router.get_handler(
        action(|_ctx: ExecutionContext, _params: ParamBag, done: Completion| {
            done.fail(DispatchError::action("database unavailable"));
        }),
        "/test",
        RouteMeta::new(RouteTarget::controller("test", "index")),
    );

    let recorder = Arc::new(RecordingResponse::default());
    let (next, errors) = capture_next();
    handler(RouteRequest::new("/test"), recorder.clone() as Arc<dyn RouteResponse>, next);

    assert!(recorder.calls().is_empty());
    let errors = errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("database unavailable"));
}

#[tokio::test]
async fn test_async_completion_renders_later() {
    let router = Router::default();
    let handler = router.get_handler(
        action(|_ctx: ExecutionContext, params: ParamBag, done: Completion| {
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                done.render("later", json!({ "id": params.get("id") }));
            });
        }),
        "/later/:id",
        RouteMeta::new(RouteTarget::controller("later", "show")),
    );

    let recorder = Arc::new(RecordingResponse::default());
    let req = RouteRequest::new("/later/7")
        .with_route_keys(["id"])
        .with_param("id", "7");
    handler(req, recorder.clone() as Arc<dyn RouteResponse>, Next::log());

    for _ in 0..100 {
        if !recorder.renders().is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    let renders = recorder.renders();
    assert_eq!(renders.len(), 1);
    assert_eq!(renders[0].1.locals, json!({"id": "7"}));
}

// ============================================================================
// Controller resolution
// ============================================================================

#[test]
fn test_unregistered_action_reports_unknown() {
    let mut router = Router::default();
    let route = router.route("/ghost", "ghost#index", None).unwrap();

    let recorder = Arc::new(RecordingResponse::default());
    let (next, errors) = capture_next();
    (route.handler)(RouteRequest::new("/ghost"), recorder.clone() as Arc<dyn RouteResponse>, next);

    assert!(recorder.calls().is_empty());
    let errors = errors.lock().unwrap();
    assert!(matches!(
        &errors[0],
        DispatchError::UnknownAction { controller, action } if controller == "ghost" && action == "index"
    ));
}

#[test]
fn test_redirect_route_handler() {
    let mut router = Router::default();
    let route = router
        .route("/home", RouteTarget::redirect("/"), None)
        .unwrap();

    let recorder = Arc::new(RecordingResponse::default());
    (route.handler)(RouteRequest::new("/home"), recorder.clone() as Arc<dyn RouteResponse>, Next::log());

    let redirects = recorder.redirects();
    assert_eq!(redirects.len(), 1);
    assert_eq!(redirects[0].path, "/");
    assert_eq!(redirects[0].status, None);
}
