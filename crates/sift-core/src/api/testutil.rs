//! Loopback HTTP fixture for backend and detector tests.
//!
//! Serves canned responses keyed by request path so tests can assert which
//! endpoint a component actually hit, without a network.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// (path, status, body) table entry.
pub(crate) type Route = (&'static str, u16, &'static str);

/// A one-shot HTTP server bound to an ephemeral loopback port.
pub(crate) struct MockServer {
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl MockServer {
    /// Start serving the given routes. Unrouted paths answer 404.
    pub(crate) async fn start(routes: &'static [Route]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(handle_connection(stream, routes));
            }
        });

        Self { base_url, handle }
    }

    /// An address nothing is listening on (bound, then released).
    pub(crate) fn refused_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_connection(mut stream: tokio::net::TcpStream, routes: &'static [Route]) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    // Read up to the end of the headers
    let header_end = loop {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
                    break pos + 4;
                }
            }
        }
    };

    // Drain the body so the client never sees a reset mid-write
    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
    let (status, body) = routes
        .iter()
        .find(|(route_path, _, _)| *route_path == path)
        .map(|(_, status, body)| (*status, *body))
        .unwrap_or((404, ""));

    let reason = if (200..300).contains(&status) { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
