//! Route registration and dispatch through the full router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::json;

use simple_routes::config::AppConfig;
use simple_routes::demo::{self, MyViewsClass};
use simple_routes::view::{MappedView, Target, ViewMapper, ViewSettings};
use simple_routes::{
    view_fn, ClassView, Context, Kwargs, Matchdict, SimpleRouteExt, SimpleRouteOptions,
    ViewResult,
};

mod common;

fn json_options() -> SimpleRouteOptions {
    SimpleRouteOptions::new().renderer("json")
}

#[tokio::test]
async fn test_imperative_config_function() {
    let mut config = common::make_config();
    config
        .add_simple_route("/path/to/view", view_fn!(demo::my_view), json_options())
        .unwrap();

    let response = common::get(&common::make_app(config), "/path/to/view").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), Some("application/json"));
    assert_eq!(response.json(), json!({"foo": "bar"}));
}

#[tokio::test]
async fn test_imperative_config_function_with_dotted_path() {
    let mut config = common::make_config();
    config
        .add_simple_route("/path/to/view", "demo.my_view", json_options())
        .unwrap();

    let response = common::get(&common::make_app(config), "/path/to/view").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), Some("application/json"));
    assert_eq!(response.json(), json!({"foo": "bar"}));
}

#[tokio::test]
async fn test_imperative_config_method() {
    let mut config = common::make_config();
    config
        .add_simple_route(
            "/path/to/view",
            ClassView::of::<MyViewsClass>(),
            json_options().attr("imperative_view"),
        )
        .unwrap();

    let response = common::get(&common::make_app(config), "/path/to/view").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({"foo": "bar"}));
}

#[tokio::test]
async fn test_imperative_config_method_with_dotted_path() {
    let mut config = common::make_config();
    config
        .add_simple_route(
            "/path/to/view",
            "demo:MyViewsClass",
            json_options().attr("imperative_view"),
        )
        .unwrap();

    let response = common::get(&common::make_app(config), "/path/to/view").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), Some("application/json"));
    assert_eq!(response.json(), json!({"foo": "bar"}));
}

#[tokio::test]
async fn test_declarative_config_function() {
    let mut config = common::make_config();
    config.scan(demo::routes()).unwrap();

    let response = common::get(&common::make_app(config), "/path/to/decorated/view/func").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), Some("application/json"));
    assert_eq!(response.json(), json!({"foo": "bar"}));
}

#[tokio::test]
async fn test_declarative_config_method() {
    let mut config = common::make_config();
    config.scan(demo::routes()).unwrap();

    let response =
        common::get(&common::make_app(config), "/path/to/decorated/view/method").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), Some("application/json"));
    assert_eq!(response.json(), json!({"foo": "bar"}));
}

#[tokio::test]
async fn test_matchdict_method() {
    let mut config = common::make_config();
    config.scan(demo::routes()).unwrap();

    let response = common::get(&common::make_app(config), "/matchdict/sontek/1").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({"foo": "sontek", "bar": "1"}));
}

#[tokio::test]
async fn test_matchdict_class_method() {
    let mut config = common::make_config();
    config
        .add_simple_route(
            "/matchdict_class/{name}/{number}",
            "demo.MyViewsClass",
            json_options().attr("matchdict_view"),
        )
        .unwrap();

    let response = common::get(&common::make_app(config), "/matchdict_class/sontek/1").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({"foo": "sontek", "bar": "1"}));
}

#[tokio::test]
async fn test_context_request_class_method() {
    let mut config = common::make_config();
    config
        .add_simple_route(
            "/ctx/{name}/{number}",
            "demo.MyViewsClassWithContext",
            json_options().attr("matchdict_view"),
        )
        .unwrap();

    let response = common::get(&common::make_app(config), "/ctx/sontek/2").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({"foo": "sontek", "bar": "2"}));
}

#[tokio::test]
async fn test_bad_class_constructor_fails_at_request_time() {
    let mut config = common::make_config();
    config
        .add_simple_route(
            "/bad",
            "demo.BadClass",
            json_options().attr("imperative_view"),
        )
        .unwrap();

    let response = common::get(&common::make_app(config), "/bad").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response
        .text()
        .contains("Class should accept `context` and `request` args only"));
}

#[test]
fn test_imperative_route_name() {
    let mut config = common::make_config();
    config
        .add_simple_route("/path/to/view", view_fn!(demo::my_view), json_options())
        .unwrap();

    let routes = config.routes().get_routes();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].name(), "my_view");
}

#[test]
fn test_declarative_route_names() {
    let mut config = common::make_config();
    config.scan(demo::routes()).unwrap();

    let names: Vec<_> = config
        .routes()
        .get_routes()
        .iter()
        .map(|r| r.name().to_string())
        .collect();

    assert_eq!(
        names,
        vec![
            "decorated_view",
            "matchdict_view",
            "url_view",
            "MyViewsClass.imperative_view",
            "MyViewsClass.matchdict_view",
            "MyViewsClassWithContext.imperative_view",
            "MyViewsClassWithContext.matchdict_view",
        ]
    );
}

#[test]
fn test_repeated_registration_gets_numbered_names() {
    let mut config = common::make_config();
    for path in ["/one", "/two", "/three"] {
        config
            .add_simple_route(path, "demo.my_view", json_options())
            .unwrap();
    }

    let names: Vec<_> = config
        .routes()
        .get_routes()
        .iter()
        .map(|r| r.name().to_string())
        .collect();
    assert_eq!(names, vec!["my_view", "my_view_0", "my_view_1"]);
}

#[tokio::test]
async fn test_numbered_routes_all_dispatch() {
    let mut config = common::make_config();
    for path in ["/one", "/two"] {
        config
            .add_simple_route(path, "demo.my_view", json_options())
            .unwrap();
    }
    let app = common::make_app(config);

    assert_eq!(common::get(&app, "/one").await.status, StatusCode::OK);
    assert_eq!(common::get(&app, "/two").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_route_url_from_view() {
    let mut config = common::make_config();
    config.scan(demo::routes()).unwrap();

    let response = common::get(&common::make_app(config), "/get_url").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({"url": "http://localhost/matchdict/name/1"})
    );
}

#[tokio::test]
async fn test_optional_trailing_slash() {
    let mut config = common::make_config();
    config
        .add_simple_route("/slashed", "demo.my_view", json_options())
        .unwrap();
    config
        .add_simple_route("/strict", "demo.my_view", json_options().append_slash(false))
        .unwrap();
    let app = common::make_app(config);

    assert_eq!(common::get(&app, "/slashed").await.status, StatusCode::OK);
    assert_eq!(common::get(&app, "/slashed/").await.status, StatusCode::OK);
    assert_eq!(common::get(&app, "/strict").await.status, StatusCode::OK);
    assert_eq!(common::get(&app, "/strict/").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_matchdict_excludes_optional_slash() {
    let mut config = common::make_config();
    config
        .add_simple_route("/echo/{name}/{number}", "demo.matchdict_view", json_options())
        .unwrap();

    let response = common::get(&common::make_app(config), "/echo/a/9/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({"foo": "a", "bar": "9"}));
}

#[tokio::test]
async fn test_without_matchdict_forwarding() {
    let mut config = common::make_config();
    config
        .add_simple_route(
            "/echo/{name}/{number}",
            "demo.matchdict_view",
            json_options().append_matchdict(false),
        )
        .unwrap();

    let response = common::get(&common::make_app(config), "/echo/a/9").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.text().contains("missing view argument `name`"));
}

#[tokio::test]
async fn test_accept_predicate() {
    let mut config = common::make_config();
    config
        .add_simple_route("/data", "demo.my_view", json_options())
        .unwrap();
    let app = common::make_app(config);

    let ok = common::get_with_accept(&app, "/data", "application/json").await;
    assert_eq!(ok.status, StatusCode::OK);

    let wildcard = common::get_with_accept(&app, "/data", "*/*").await;
    assert_eq!(wildcard.status, StatusCode::OK);

    let html = common::get_with_accept(&app, "/data", "text/html").await;
    assert_eq!(html.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_string_renderer() {
    let mut config = common::make_config();
    config
        .add_simple_route(
            "/text/{name}/{number}",
            "demo.matchdict_view",
            SimpleRouteOptions::new().renderer("string"),
        )
        .unwrap();

    let response =
        common::get_with_accept(&common::make_app(config), "/text/a/1", "text/plain").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), Some("text/plain"));
    assert_eq!(response.json(), json!({"foo": "a", "bar": "1"}));
}

#[tokio::test]
async fn test_request_method_predicate() {
    let mut config = common::make_config();
    config
        .add_simple_route(
            "/only-get",
            "demo.my_view",
            json_options().request_method(Method::GET),
        )
        .unwrap();
    let app = common::make_app(config);

    assert_eq!(
        common::request(&app, Method::GET, "/only-get").await.status,
        StatusCode::OK
    );
    assert_eq!(
        common::request(&app, Method::HEAD, "/only-get").await.status,
        StatusCode::OK
    );
    assert_eq!(
        common::request(&app, Method::POST, "/only-get").await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_default_route_under_include() {
    let mut config = common::make_config();
    config
        .include("/v1", |c| {
            c.add_simple_route("/", "demo.my_view", json_options())?;
            c.add_simple_route("/items/{name}/{number}", "demo.matchdict_view", json_options())
        })
        .unwrap();
    let app = common::make_app(config);

    assert_eq!(common::get(&app, "/v1").await.status, StatusCode::OK);
    assert_eq!(common::get(&app, "/v1/").await.status, StatusCode::OK);
    assert_eq!(
        common::get(&app, "/v1/items/x/1").await.json(),
        json!({"foo": "x", "bar": "1"})
    );
}

#[tokio::test]
async fn test_route_prefix_from_settings() {
    let mut app_config = AppConfig::default();
    app_config.routes.route_prefix = "/api".into();

    let app = common::make_app_with(app_config, |c| c.scan(demo::routes()));

    assert_eq!(common::get(&app, "/api/matchdict/a/1").await.status, StatusCode::OK);
    assert_eq!(common::get(&app, "/matchdict/a/1").await.status, StatusCode::NOT_FOUND);
    assert_eq!(
        common::get(&app, "/api/get_url").await.json(),
        json!({"url": "http://localhost/api/matchdict/name/1"})
    );
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let mut config = common::make_config();
    config.scan(demo::routes()).unwrap();

    let response = common::get(&common::make_app(config), "/nowhere").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_body_limit() {
    let mut app_config = AppConfig::default();
    app_config.limits.max_body_bytes = 4;
    let app = common::make_app_with(app_config, |c| {
        c.add_simple_route("/upload", "demo.my_view", json_options())
    });

    let request = Request::post("/upload")
        .body(Body::from("far too long"))
        .unwrap();
    let response = common::send(&app, request).await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);

    let request = Request::post("/upload").body(Body::from("ok")).unwrap();
    assert_eq!(common::send(&app, request).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_broken_body_is_a_bad_request() {
    let app = common::make_app_with(AppConfig::default(), |c| {
        c.add_simple_route("/upload", "demo.my_view", json_options())
    });

    let chunks: Vec<Result<axum::body::Bytes, std::io::Error>> = vec![
        Ok(axum::body::Bytes::from_static(b"ab")),
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
    ];
    let request = Request::post("/upload")
        .body(Body::from_stream(futures_util::stream::iter(chunks)))
        .unwrap();

    let response = common::send(&app, request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[test]
fn test_unknown_renderer_is_a_configuration_error() {
    let mut config = common::make_config();
    let err = config
        .add_simple_route(
            "/page",
            "demo.my_view",
            SimpleRouteOptions::new().renderer("templates/page.pt"),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        simple_routes::ConfigurationError::UnknownRenderer(_)
    ));
}

#[tokio::test]
async fn test_retry_after_failed_registration() {
    let mut config = common::make_config();
    assert!(config
        .add_simple_route("/page", "demo.my_view", SimpleRouteOptions::new().renderer("nope"))
        .is_err());
    assert!(config.routes().is_empty());

    config
        .add_simple_route("/page", "demo.my_view", json_options())
        .unwrap();
    let names: Vec<_> = config
        .routes()
        .get_routes()
        .iter()
        .map(|r| r.name().to_string())
        .collect();
    assert_eq!(names, vec!["my_view"]);

    let response = common::get(&common::make_app(config), "/page").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({"foo": "bar"}));
}

fn echo(_request: &simple_routes::Request, kwargs: &Kwargs) -> ViewResult {
    Ok(serde_json::to_value(kwargs).unwrap().into())
}

/// Passes the raw matchdict, tagged, to function views.
struct TaggingMapper;

impl ViewMapper for TaggingMapper {
    fn map_view(&self, target: Target, _settings: &ViewSettings) -> MappedView {
        Arc::new(move |_context: &Context, request: &simple_routes::Request| {
            let mut kwargs = request.matchdict().clone();
            kwargs.insert("mapper", "tagging");
            match &target {
                Target::Function(view) => view.call(request, &kwargs),
                Target::Class(_) => Ok(json!(null).into()),
            }
        })
    }
}

#[tokio::test]
async fn test_custom_mapper_replaces_matchdict_mapper() {
    let mut config = common::make_config();
    config
        .add_simple_route(
            "/tagged/{name}",
            view_fn!(echo),
            json_options().mapper(TaggingMapper),
        )
        .unwrap();
    config
        .add_simple_route("/plain/{name}", view_fn!(echo), json_options())
        .unwrap();
    let app = common::make_app(config);

    // The custom mapper sees the reserved key; the default one strips it.
    assert_eq!(
        common::get(&app, "/tagged/abc/").await.json(),
        json!({"name": "abc", "optional_slash": "/", "mapper": "tagging"})
    );
    assert_eq!(
        common::get(&app, "/plain/abc/").await.json(),
        json!({"name": "abc"})
    );
}

fn default_number(
    _request: &simple_routes::Request,
    elements: Vec<String>,
    mut kwargs: Matchdict,
) -> (Vec<String>, Matchdict) {
    kwargs.insert_default("number", "1");
    (elements, kwargs)
}

#[tokio::test]
async fn test_caller_pregenerator_wiring() {
    let mut config = common::make_config();
    config
        .add_simple_route(
            "/slashed/{name}/{number}",
            "demo.matchdict_view",
            json_options().pregenerator(default_number),
        )
        .unwrap();
    config
        .add_simple_route(
            "/strict/{name}/{number}",
            "demo.matchdict_view",
            json_options().append_slash(false).pregenerator(default_number),
        )
        .unwrap();

    let strict = config.routes().get_route("matchdict_view_0").unwrap();
    assert_eq!(strict.pattern().as_str(), "/strict/{name}/{number}");
    assert!(strict.pregenerator().is_some());

    let app = config.make_app();
    let request = simple_routes::Request::blank("/").with_routes(app.routes().clone());
    let name_only = || Matchdict::from([("name", "x")]);

    // Caller runs first, then the empty optional_slash is filled in.
    assert_eq!(
        request.route_path("matchdict_view", name_only()).unwrap(),
        "/slashed/x/1"
    );
    // Without append_slash the caller's pregenerator is used as is.
    assert_eq!(
        request.route_path("matchdict_view_0", name_only()).unwrap(),
        "/strict/x/1"
    );

    let router = simple_routes::HttpServer::new(AppConfig::default(), app).router();
    assert_eq!(
        common::get(&router, "/slashed/x/1").await.json(),
        json!({"foo": "x", "bar": "1"})
    );
}
