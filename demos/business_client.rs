//! Runs a toy `::business::IBusiness` server on localhost and talks to it
//! through an `ice_client!` client.
//!
//! ```text
//! RUST_LOG=ice_rpc=debug cargo run --example business_client
//! ```

use ice_rpc::transport::types::{Request, Response, RpcError, error_codes};
use ice_rpc::{CallError, ClientConfig, ice_client};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

ice_client! {
    /// Client for `::business::IBusiness`.
    pub struct BusinessClient: "::business::IBusiness" {
        "LicenseCheck" => license_check,
        "Login" => login,
        "QueryUserList" => query_user_list,
        "Broken" => broken,
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn handle(request: &Request) -> Response {
    let id = request.id.clone();
    let first = request
        .params
        .as_ref()
        .and_then(|p| p.get(0))
        .and_then(Value::as_str)
        .unwrap_or_default();

    match request.method.as_str() {
        "ice_isA" => Response::success(json!(true), id),
        "LicenseCheck" => Response::success(json!(r#"{"valid":true}"#), id),
        "Login" => {
            let user = serde_json::from_str::<Value>(first)
                .ok()
                .and_then(|v| v.get("user").cloned())
                .unwrap_or(Value::Null);
            Response::success(json!(json!({"token": "t-1", "user": user}).to_string()), id)
        }
        "QueryUserList" => Response::success(json!(r#"[{"user":"admin"}]"#), id),
        "Broken" => Response::success(json!("<html>not json</html>"), id),
        _ => Response::error(
            RpcError::new(error_codes::METHOD_NOT_FOUND, "Method not found"),
            id,
        ),
    }
    .with_correlation_id(request.correlation_id.clone())
}

async fn serve(stream: TcpStream) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        let Ok(request) = serde_json::from_str::<Request>(&line) else {
            tracing::warn!(line = %line, "ignoring malformed request");
            continue;
        };
        tracing::debug!(method = %request.method, "server received request");
        let mut out = serde_json::to_string(&handle(&request))?;
        out.push('\n');
        writer.write_all(out.as_bytes()).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        while let Ok((stream, peer)) = listener.accept().await {
            tracing::info!(%peer, "accepted connection");
            tokio::spawn(async move {
                if let Err(e) = serve(stream).await {
                    tracing::warn!(error = %e, "connection closed");
                }
            });
        }
    });

    let config = ClientConfig::new(addr.ip().to_string(), addr.port());
    let client = BusinessClient::tcp(&config);
    tracing::info!(proxy = %config.descriptor(), "client ready");

    // Both calls race to connect; only one checked cast goes out.
    let (license, users) = tokio::join!(client.license_check(()), client.query_user_list(()));
    let (license, users) = (license?, users?);
    tracing::info!(%license, %users, "first round");
    tracing::info!(casts = client.dispatcher().cache().cast_attempts(), "after first round");

    let session = client
        .login(json!({"user": "admin", "password": "secret"}))
        .await?;
    tracing::info!(%session, "logged in");

    match client.broken(()).await {
        Err(CallError::ResponseParseFailed { raw, .. }) => {
            tracing::info!(%raw, connected = client.dispatcher().cache().is_connected(), "unparseable reply");
        }
        other => tracing::warn!(?other, "unexpected outcome"),
    }

    client.reconnect();
    let users = client.query_user_list(()).await?;
    tracing::info!(%users, casts = client.dispatcher().cache().cast_attempts(), "after reconnect");

    Ok(())
}
