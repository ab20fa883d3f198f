//! In-process HTTP collector for end-to-end tests
//!
//! Accepts one request per connection, records it and replies with a fixed
//! status. `Connection: close` keeps the framing trivial.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// One request as seen by the collector
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    /// Header names lowercased
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy)]
enum Reply {
    Status(u16),
    /// Read the request, then never answer
    Hang,
}

/// Mock collector bound to an ephemeral localhost port
pub struct MockCollector {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockCollector {
    /// Collector answering every request with `status`
    pub async fn start(status: u16) -> Result<Self> {
        Self::spawn(Reply::Status(status)).await
    }

    /// Collector that records requests but never responds
    pub async fn hanging() -> Result<Self> {
        Self::spawn(Reply::Hang).await
    }

    async fn spawn(reply: Reply) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let addr = listener.local_addr()?;
        let requests = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let server_requests = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    res = listener.accept() => {
                        let Ok((sock, _)) = res else { continue };
                        let requests = Arc::clone(&server_requests);
                        tokio::spawn(async move {
                            let _ = serve_one(sock, reply, requests).await;
                        });
                    }
                }
            }
        });

        Ok(Self {
            addr,
            requests,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Requests recorded so far, in arrival order
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Drop for MockCollector {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Address nothing listens on
pub async fn refused_url() -> Result<String> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}/ingest"))
}

async fn serve_one(
    mut sock: TcpStream,
    reply: Reply,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
) -> Result<()> {
    let mut buf = Vec::with_capacity(8 * 1024);
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let read = sock.read(&mut chunk).await?;
        anyhow::ensure!(read > 0, "client disconnected before headers");
        buf.extend_from_slice(&chunk[..read]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = std::str::from_utf8(&buf[..header_end])?.to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines
        .next()
        .ok_or_else(|| anyhow::anyhow!("missing request line"))?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = HashMap::new();
    for line in lines {
        if let Some((k, v)) = line.split_once(':') {
            headers.insert(k.trim().to_ascii_lowercase(), v.trim().to_string());
        }
    }

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let body_start = header_end + 4;
    while buf.len() < body_start + content_length {
        let read = sock.read(&mut chunk).await?;
        anyhow::ensure!(read > 0, "client disconnected before body");
        buf.extend_from_slice(&chunk[..read]);
    }
    let body = buf[body_start..body_start + content_length].to_vec();

    if let Ok(mut guard) = requests.lock() {
        guard.push(CapturedRequest {
            method,
            path,
            headers,
            body,
        });
    }

    match reply {
        Reply::Status(status) => {
            let response = format!(
                "HTTP/1.1 {status} Mock\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok"
            );
            sock.write_all(response.as_bytes()).await?;
            sock.shutdown().await?;
        }
        Reply::Hang => {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    }

    Ok(())
}
