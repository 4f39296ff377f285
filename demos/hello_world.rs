use lean_web::{Handler, PrefixRouter, Request, Response, Server, StatusCode};
use tokio::net::TcpListener;

struct HelloWorld;

impl Handler for HelloWorld {
    fn handle(&self, _: &Request, resp: &mut Response) -> StatusCode {
        resp.mime_type("text/plain").body("Hello, world!");
        StatusCode::Ok
    }
}

#[tokio::main]
async fn main() {
    Server::builder()
        .listener(TcpListener::bind("127.0.0.1:8080").await.unwrap())
        .router(PrefixRouter::new().route("/", HelloWorld))
        .build()
        .launch()
        .await;
}
