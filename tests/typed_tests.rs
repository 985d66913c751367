use schemaroute::route::{status, ContentType, ResponseSpec, RouteSchema};
use schemaroute::router::Router;
use schemaroute::runtime_config::RuntimeConfig;
use schemaroute::schema::Typed;
use schemaroute::typed::Reply;
use schemaroute::{Request, Server};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
struct OrderPath {
    order_id: u64,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
struct Paging {
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    verbose: bool,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
struct ClientHeaders {
    #[serde(rename = "x-client")]
    client: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
struct Order {
    id: u64,
    item: String,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
struct NewOrder {
    item: String,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
struct Problem {
    message: String,
}

fn server(router: Router) -> Server {
    let mut server = Server::with_config(RuntimeConfig::default());
    server.use_routers([router]).unwrap();
    server
}

fn orders() -> Server {
    let mut router = Router::new();
    router
        .get(
            "/orders/:orderId",
            RouteSchema::new()
                .params(Typed::<OrderPath>::new())
                .query(Typed::<Paging>::new())
                .response(status::OK, ResponseSpec::new("The order").json(Typed::<Order>::new()))
                .response(status::NOT_FOUND, ResponseSpec::new("Unknown order").json(Typed::<Problem>::new())),
            |req| {
                let order_id: u64 = req.params.order_id;
                if order_id == 7 {
                    let item = if req.query.verbose { "widget (blue)" } else { "widget" };
                    Reply::new(
                        status::OK,
                        Order {
                            id: order_id,
                            item: item.to_string(),
                        },
                    )
                } else {
                    Reply::new(
                        status::NOT_FOUND,
                        Problem {
                            message: format!("order {order_id} not found"),
                        },
                    )
                }
            },
        )
        .unwrap();
    server(router)
}

#[test]
fn test_params_and_query_are_projected() {
    let server = orders();
    let res = server.dispatch(
        Request::new(http::Method::GET, "/orders/7").with_query("verbose", "true"),
    );
    assert_eq!(res.status, 200);
    assert_eq!(res.content_type, Some(ContentType::ApplicationJson));
    assert_eq!(res.body_json().unwrap(), json!({ "id": 7, "item": "widget (blue)" }));
}

#[test]
fn test_declared_not_found_reply() {
    let res = orders().dispatch(Request::new(http::Method::GET, "/orders/8"));
    assert_eq!(res.status, 404);
    assert_eq!(res.body_json().unwrap()["message"], "order 8 not found");
}

#[test]
fn test_unconvertible_param_is_rejected() {
    let res = orders().dispatch(Request::new(http::Method::GET, "/orders/seven"));
    assert_eq!(res.status, 400);
}

#[test]
fn test_body_is_projected() {
    let mut router = Router::new();
    router
        .post(
            "/orders",
            RouteSchema::new()
                .json_body(Typed::<NewOrder>::new())
                .response(status::CREATED, ResponseSpec::new("Created").json(Typed::<Order>::new())),
            |req| {
                let new: NewOrder = req.body;
                Reply::new(status::CREATED, Order { id: 1, item: new.item })
            },
        )
        .unwrap();
    let res = server(router).dispatch(
        Request::new(http::Method::POST, "/orders").with_json(&json!({ "item": "gear" })),
    );
    assert_eq!(res.status, 201);
    assert_eq!(res.body_json().unwrap(), json!({ "id": 1, "item": "gear" }));
}

#[test]
fn test_headers_are_projected() {
    let mut router = Router::new();
    router
        .get(
            "/whoami",
            RouteSchema::new()
                .headers(Typed::<ClientHeaders>::new())
                .response(status::OK, ResponseSpec::new("Caller").text(Typed::<String>::new())),
            |req| Reply::new(status::OK, req.headers.client),
        )
        .unwrap();
    let server = server(router);

    let res = server.dispatch(
        Request::new(http::Method::GET, "/whoami").with_header("X-Client", "cli/1.2"),
    );
    assert_eq!(res.status, 200);
    assert_eq!(res.content_type, Some(ContentType::TextPlain));
    assert_eq!(res.body_text(), "cli/1.2");

    let res = server.dispatch(Request::new(http::Method::GET, "/whoami"));
    assert_eq!(res.status, 400);
}

#[test]
fn test_undeclared_parts_fall_back_to_dictionaries() {
    let mut router = Router::new();
    router
        .get(
            "/raw/:name",
            RouteSchema::new().response(status::OK, ResponseSpec::new("Echo").json(Typed::<serde_json::Value>::new())),
            |req| {
                let params: HashMap<String, String> = req.params;
                let query: HashMap<String, String> = req.query;
                Reply::new(
                    status::OK,
                    json!({ "name": params["name"], "q": query.get("q"), "body": req.body }),
                )
            },
        )
        .unwrap();
    let res = server(router).dispatch(Request::new(http::Method::GET, "/raw/rex").with_query("q", "1"));
    assert_eq!(res.status, 200);
    assert_eq!(res.body_json().unwrap(), json!({ "name": "rex", "q": "1", "body": null }));
}
