//! HTTP service for the portfolio backend.
//!
//! Two routes: `GET /api/resume` streams the configured PDF and
//! `POST /api/contact` accepts (and logs) a contact form. One request per
//! connection; every response carries `Connection: close`.

use std::net::SocketAddr;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use crate::config::ServerConfig;
use crate::error::ServerError;

pub const MAX_BODY_BYTES: usize = 64 * 1024;
const MAX_HEAD_BYTES: usize = 8 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    /// Path without the query string.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Request {
    pub fn new(method: &str, path: &str, body: &[u8]) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            headers: Vec::new(),
            body: body.to_vec(),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn content_length(&self) -> Result<usize, ServerError> {
        match self.header("content-length") {
            None => Ok(0),
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| ServerError::BadRequest(format!("invalid Content-Length {:?}", v))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: value.to_string().into_bytes(),
        }
    }

    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "error": message }))
    }

    pub fn attachment(content_type: &str, filename: &str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            headers: vec![
                ("Content-Type".to_string(), content_type.to_string()),
                (
                    "Content-Disposition".to_string(),
                    format!("attachment; filename=\"{}\"", filename),
                ),
            ],
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Serialize with status line, framing headers and body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status, reason_phrase(self.status));
        for (k, v) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", k, v));
        }
        head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        head.push_str("Connection: close\r\n\r\n");
        let mut out = head.into_bytes();
        out.extend_from_slice(&self.body);
        out
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Contact form body. Every field is optional and nothing is validated.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactMessage {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

// ── Routing ────────────────────────────────────────────────────────

pub fn route(request: &Request, config: &ServerConfig) -> Response {
    match (request.method.as_str(), request.path.as_str()) {
        ("GET", "/api/resume") => resume(config),
        ("POST", "/api/contact") => contact(&request.body),
        _ => Response::error(404, "Not found"),
    }
}

fn resume(config: &ServerConfig) -> Response {
    match std::fs::read(&config.resume_path) {
        Ok(bytes) => {
            let filename = config
                .resume_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "resume.pdf".to_string());
            log::debug!("serving {} ({} bytes)", config.resume_path.display(), bytes.len());
            Response::attachment("application/pdf", &filename, bytes)
        }
        Err(e) => {
            log::warn!("resume unavailable at {}: {}", config.resume_path.display(), e);
            Response::error(404, "Resume not found")
        }
    }
}

fn contact(body: &[u8]) -> Response {
    match serde_json::from_slice::<ContactMessage>(body) {
        Ok(msg) => log::info!(
            "contact form: name={:?} email={:?} subject={:?} message={:?}",
            msg.name.as_deref().unwrap_or(""),
            msg.email.as_deref().unwrap_or(""),
            msg.subject.as_deref().unwrap_or(""),
            msg.message.as_deref().unwrap_or(""),
        ),
        Err(e) => log::warn!("contact form with unreadable body ({} bytes): {}", body.len(), e),
    }
    Response::json(
        200,
        json!({ "success": true, "message": "Message received successfully!" }),
    )
}

// ── Wire ───────────────────────────────────────────────────────────

/// Parse the request line and headers (without the blank line).
pub fn parse_head(head: &str) -> Result<Request, ServerError> {
    let mut lines = head.lines();
    let request_line = lines
        .next()
        .filter(|l| !l.trim().is_empty())
        .ok_or_else(|| ServerError::BadRequest("empty request".to_string()))?;

    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target), Some(version), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ServerError::BadRequest(format!("malformed request line {:?}", request_line)));
    };
    if !version.starts_with("HTTP/1.") {
        return Err(ServerError::BadRequest(format!("unsupported version {:?}", version)));
    }
    if !target.starts_with('/') {
        return Err(ServerError::BadRequest(format!("unsupported target {:?}", target)));
    }
    let path = target.split(['?', '#']).next().unwrap_or(target);

    let mut headers = Vec::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ServerError::BadRequest(format!("malformed header {:?}", line)))?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    Ok(Request {
        method: method.to_ascii_uppercase(),
        path: path.to_string(),
        headers,
        body: Vec::new(),
    })
}

/// Read one request (head plus `Content-Length` body). The head is read
/// through a byte budget so an endless line can't grow the buffer.
pub async fn read_request<R>(reader: R) -> Result<Request, ServerError>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut head = Vec::new();
    loop {
        let start = head.len();
        let budget = (MAX_HEAD_BYTES + 1 - start) as u64;
        let n = (&mut reader).take(budget).read_until(b'\n', &mut head).await?;
        if n == 0 {
            return Err(ServerError::BadRequest("connection closed mid-request".to_string()));
        }
        if head.len() > MAX_HEAD_BYTES {
            return Err(ServerError::BadRequest("request head too large".to_string()));
        }
        if matches!(&head[start..], b"\r\n" | b"\n") {
            head.truncate(start);
            break;
        }
    }
    let head = String::from_utf8(head)
        .map_err(|_| ServerError::BadRequest("request head is not UTF-8".to_string()))?;

    let mut request = parse_head(&head)?;
    let len = request.content_length()?;
    if len > MAX_BODY_BYTES {
        return Err(ServerError::PayloadTooLarge(len, MAX_BODY_BYTES));
    }
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    request.body = body;
    Ok(request)
}

async fn handle_connection(mut socket: TcpStream, config: Arc<ServerConfig>) -> Result<(), ServerError> {
    let (reader, mut writer) = socket.split();
    let response = match read_request(reader).await {
        Ok(request) => {
            log::debug!("{} {}", request.method, request.path);
            // Route reads the resume from disk.
            tokio::task::spawn_blocking(move || route(&request, &config))
                .await
                .unwrap_or_else(|e| {
                    log::error!("route task failed: {}", e);
                    Response::error(500, "Internal server error")
                })
        }
        Err(ServerError::BadRequest(why)) => {
            log::warn!("bad request: {}", why);
            Response::error(400, "Bad request")
        }
        Err(ServerError::PayloadTooLarge(len, limit)) => {
            log::warn!("rejecting {} byte body (limit {})", len, limit);
            Response::error(413, "Payload too large")
        }
        Err(e) => return Err(e),
    };
    writer.write_all(&response.to_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Bind and serve until the task is dropped. `ready_tx` receives the bound
/// address, which matters when the configured port is 0.
pub async fn run_server(config: ServerConfig, ready_tx: Option<oneshot::Sender<SocketAddr>>) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bound = listener.local_addr()?;
    log::info!("listening on http://{}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let config = Arc::new(config);
    loop {
        let (socket, peer) = listener.accept().await?;
        let config = Arc::clone(&config);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, config).await {
                log::warn!("connection {} error: {}", peer, e);
            }
        });
    }
}
