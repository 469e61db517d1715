use forge_http::{handler, Request, Server};

fn inspect(req: &Request) -> forge_http::Handled {
    let mut headers = serde_json::Map::new();
    for (name, value) in req.headers().iter() {
        headers.insert(name.to_string(), serde_json::Value::String(value.to_string()));
    }

    let body = String::from_utf8_lossy(req.body()).into_owned();

    handler::json(
        forge_http::StatusCode::Ok,
        serde_json::json!({
            "method": req.method(),
            "path": req.path(),
            "headers": headers,
            "body": body,
        }),
    )
}

fn main() -> Result<(), forge_http::ServerError> {
    env_logger::init();

    let server = Server::builder()
        .host("127.0.0.1")
        .port(8080)
        .route("/", inspect)?
        .build();

    println!("listening on http://{}:{}", server.host(), server.port());
    server.run()
}
