//! A client sending `Transfer-Encoding: chunked` never has to declare the
//! body length up front; the handler sees the fully reassembled body no
//! differently than if `Content-Length` framing had been used.
use forge_http::{handler, Request, Server};

fn echo_chunked(req: &Request) -> forge_http::Handled {
    let body = String::from_utf8_lossy(req.body()).into_owned();
    handler::ok(format!("received {} bytes: {body}", req.body().len()))
}

fn main() -> Result<(), forge_http::ServerError> {
    env_logger::init();

    let server = Server::builder()
        .host("127.0.0.1")
        .port(8080)
        .post("/test-chunked", echo_chunked)?
        .build();

    println!("listening on http://{}:{}", server.host(), server.port());
    server.run()
}
