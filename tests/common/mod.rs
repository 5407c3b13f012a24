//! Shared test fixtures: a demo application handler and server startup.

use std::net::SocketAddr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use function_gateway::config::GatewayConfig;
use function_gateway::error::GatewayError;
use function_gateway::handler::FunctionHost;
use function_gateway::http::cookies::Cookie;
use function_gateway::http::{GatewayRequest, GatewayResponse};
use function_gateway::server::EmbeddedServer;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: u32,
}

/// Four-byte PNG signature prefix, enough to exercise binary transport.
pub const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4e, 0x47];

/// Demo application routing on the request path, covering the surface the
/// integration tests exercise.
pub fn demo_handler(
    request: &GatewayRequest,
    response: &mut GatewayResponse,
) -> Result<(), GatewayError> {
    match request.path() {
        "/api/echo" => {
            response.set_text(format!("{} {}", request.method(), request.path()));
        }
        "/api/pets" => {
            let person: Person = request.body_as()?;
            response.content_type("application/json");
            response.set_body(json!({"name": person.name, "age": person.age}));
        }
        "/api/form" => {
            let params = request.parameters();
            response.set_text(format!(
                "Hello {} {}",
                params.get_first("name").unwrap_or("?"),
                params.get_as::<u32>("age").unwrap_or(0)
            ));
        }
        "/api/headers/accept" => {
            response.set_text(request.headers().get_all("Accept").join("|"));
        }
        "/api/image" => {
            response.content_type("image/png");
            response.write(PNG_MAGIC);
        }
        "/api/cookies" => {
            let value = request
                .cookies()
                .get_value("myCookie")
                .unwrap_or("missing")
                .to_string();
            response.cookie(Cookie::new("foo", "bar").http_only(true));
            response.set_text(value);
        }
        _ => {
            response.status(404);
            response.set_text("Not Found");
        }
    }
    Ok(())
}

/// Start an embedded server around the demo handler on an ephemeral port.
pub async fn start_demo_server() -> SocketAddr {
    let host = Arc::new(FunctionHost::new(GatewayConfig::default(), demo_handler));
    let server = EmbeddedServer::new(host);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    addr
}
