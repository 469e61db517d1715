use forge_http::{handler, Request, Server};

fn hello(req: &Request) -> forge_http::Handled {
    let name = req.query("name").unwrap_or("World");
    handler::ok(format!("Hello, {name}!"))
}

fn main() -> Result<(), forge_http::ServerError> {
    env_logger::init();

    let server = Server::builder()
        .host("127.0.0.1")
        .port(8080)
        .get("/", hello)?
        .build();

    println!("listening on http://{}:{}", server.host(), server.port());
    server.run()
}
