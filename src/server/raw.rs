use std::sync::Arc;
use std::time::Instant;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::metrics::{BackendRequest, MetricsPipeline};

const PONG_BODY: &str = r#"{"message": "pong"}"#;
const NOT_FOUND_BODY: &str = r#"{"error": "Invalid endpoint"}"#;
const BAD_REQUEST_BODY: &str = r#"{"error": "Malformed request"}"#;

// ─── Entry point ─────────────────────────────────────────────────

/// Accept loop of the raw-socket backend: no framework, one spawned
/// task per connection, a hand-rolled request-line parse.
pub async fn serve(port: u16, pipeline: Arc<MetricsPipeline>) {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .unwrap_or_else(|e| {
            panic!("Failed to bind raw backend to port {port}: {e}")
        });
    println!("Raw HTTP backend listening on port {port}");

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let pipeline = pipeline.clone();
                tokio::spawn(async move {
                    handle_connection(stream, pipeline).await;
                });
            }
            Err(e) => eprintln!("Raw backend accept error: {e}"),
        }
    }
}

// ─── Connection handler ──────────────────────────────────────────

async fn handle_connection(mut stream: TcpStream, pipeline: Arc<MetricsPipeline>) {
    // Arrival is sampled before any parsing or response work.
    let arrival = Instant::now();

    let mut buf = vec![0u8; 4096];
    let n = match stream.read(&mut buf).await {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };

    let head = String::from_utf8_lossy(&buf[..n]);
    let request_line = head.lines().next().unwrap_or("");
    let (command, path) = parse_request_line(request_line);

    let response = match (command.as_deref(), path.as_deref()) {
        (Some("GET"), Some("/ping")) => http_response(200, "OK", PONG_BODY),
        (Some(_), Some(_)) => http_response(404, "Not Found", NOT_FOUND_BODY),
        // Parser found no verb/path at all.
        _ => http_response(400, "Bad Request", BAD_REQUEST_BODY),
    };

    // A client that hung up early is its own problem, not the pipeline's.
    let _ = stream.write_all(&response).await;
    let _ = stream.shutdown().await;

    pipeline.observe(BackendRequest::Raw { command, path }, arrival);
}

/// Splits `"GET /ping HTTP/1.1"` into verb and target. Either piece
/// may be absent on a malformed line; the normalizer downgrades the
/// holes rather than this parser rejecting them.
fn parse_request_line(line: &str) -> (Option<String>, Option<String>) {
    let mut parts = line.split_whitespace();
    let command = parts.next().map(str::to_owned);
    let path = parts.next().map(str::to_owned);
    (command, path)
}

fn http_response(status: u16, reason: &str, body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 {status} {reason}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {body}",
        body.len(),
    )
    .into_bytes()
}

// ─── Tests ───────────────────────────────────────────────────────
