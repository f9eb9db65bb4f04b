//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dev_proxy::config::parse_config;
use dev_proxy::{DevServer, Shutdown};
use rcgen::CertifiedKey;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_rustls::rustls;
use tokio_rustls::rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use tokio_rustls::TlsAcceptor;

/// What a mock backend saw.
struct SeenRequest {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl SeenRequest {
    fn header(&self, name: &str) -> &str {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .unwrap_or("-")
    }
}

async fn read_request<S>(socket: &mut S) -> Option<SeenRequest>
where
    S: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[head_end + 4..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(SeenRequest {
        request_line,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    })
}

/// Answer one request with a description of what was received.
async fn echo<S>(name: &str, mut socket: S)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let Some(seen) = read_request(&mut socket).await else {
        return;
    };
    let mut parts = seen.request_line.split(' ');
    let method = parts.next().unwrap_or("-");
    let uri = parts.next().unwrap_or("-");

    let body = format!(
        "{} {} {}\nhost: {}\nx-request-id: {}\nbody: {}",
        name,
        method,
        uri,
        seen.header("host"),
        seen.header("x-request-id"),
        seen.body
    );
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nX-Backend: {}\r\n\
         Connection: close\r\n\r\n{}",
        body.len(),
        name,
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
    tokio::time::sleep(Duration::from_millis(10)).await;
}

/// Start a backend that echoes what it received.
///
/// Response body:
/// ```text
/// <name> <METHOD> <request-target>
/// host: <Host header>
/// x-request-id: <x-request-id header>
/// body: <request body>
/// ```
pub async fn start_echo_backend(name: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(echo(name, socket));
        }
    });

    addr
}

/// Start an https echo backend with a freshly generated self-signed
/// certificate. No client trusts it.
pub async fn start_tls_echo_backend(name: &'static str) -> SocketAddr {
    let CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let tls = rustls::ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![cert.der().clone()], key)
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(tls));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                // A rejected handshake ends here.
                if let Ok(stream) = acceptor.accept(socket).await {
                    echo(name, stream).await;
                }
            });
        }
    });

    addr
}

/// TOML declaration with one rule per entry: (prefix, target, secure).
pub fn declaration(entries: &[(&str, String, bool)]) -> String {
    let mut toml = String::from("compatibility_date = \"2024-04-03\"\n");
    for (prefix, target, secure) in entries {
        toml.push_str(&format!(
            "\n[vite.server.proxy.\"{}\"]\ntarget = \"{}\"\nsecure = {}\n",
            prefix, target, secure
        ));
    }
    toml
}

/// A dev server running on an ephemeral port.
pub struct RunningServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
    handle: JoinHandle<Result<(), std::io::Error>>,
}

impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        self.handle.await.unwrap().unwrap();
    }
}

pub async fn serve(toml: &str) -> RunningServer {
    let server = DevServer::new(parse_config(toml).unwrap()).unwrap();
    serve_built(server).await
}

pub async fn serve_built(server: DevServer) -> RunningServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));
    RunningServer {
        addr,
        shutdown,
        handle,
    }
}

/// Client without connection reuse, so servers can drain promptly.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
