//! Accepts both `application/x-www-form-urlencoded` and `application/json`
//! bodies on the same route, matching the two framings a browser `<form>`
//! and a JSON API client would each send.
use forge_http::{handler, Request, Server};

fn submit(req: &Request) -> forge_http::Handled {
    let (name, email) = if req.json().is_null() {
        (req.form("name").map(str::to_string), req.form("email").map(str::to_string))
    } else {
        (
            req.json().get("name").and_then(|v| v.as_str()).map(str::to_string),
            req.json().get("email").and_then(|v| v.as_str()).map(str::to_string),
        )
    };

    let Some(name) = name else {
        return handler::bad_request("Name is required");
    };
    let Some(email) = email else {
        return handler::bad_request("Email is required");
    };

    handler::ok(format!("Name: {name}, Email: {email}"))
}

fn main() -> Result<(), forge_http::ServerError> {
    env_logger::init();

    let server = Server::builder()
        .host("127.0.0.1")
        .port(8080)
        .post("/submit-data", submit)?
        .build();

    println!("listening on http://{}:{}", server.host(), server.port());
    server.run()
}
