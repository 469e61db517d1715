//! Typed path parameters (`{id:int}`) and a process-wide counter captured
//! by a handler closure -- ordinary shared-state Rust, not a server feature;
//! this crate does not model persistent per-connection or per-session data.
use forge_http::{handler, Request, Server};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

fn user_lookup(req: &Request) -> forge_http::Handled {
    match req.path_var_int("id") {
        Some(id) => handler::ok(format!("User {id}")),
        None => handler::not_found("Unknown user"),
    }
}

fn main() -> Result<(), forge_http::ServerError> {
    env_logger::init();

    let requests_seen = Arc::new(AtomicU64::new(0));
    let counter = requests_seen.clone();
    let count_handler = move |_: &Request| {
        let n = counter.fetch_add(1, Ordering::Relaxed) + 1;
        handler::json(forge_http::StatusCode::Ok, serde_json::json!({ "requests_seen": n }))
    };

    let server = Server::builder()
        .host("127.0.0.1")
        .port(8080)
        .get("/user/{id:int}", user_lookup)?
        .get("/stats", count_handler)?
        .build();

    println!("listening on http://{}:{}", server.host(), server.port());
    server.run()
}
