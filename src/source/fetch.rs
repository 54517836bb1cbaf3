//! Source byte fetching
//!
//! `http://` and `https://` sources are downloaded; anything else is a local
//! path (an optional `file://` prefix is stripped).

use bytes::{Bytes, BytesMut};

use crate::error::SourceError;

/// Whether a source string names a remote resource
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Read the raw bytes of a source, refusing anything over `limit`
pub async fn fetch(source: &str, limit: usize) -> Result<Bytes, SourceError> {
    let bytes = if is_remote(source) {
        fetch_remote(source, limit).await?
    } else {
        fetch_local(source.strip_prefix("file://").unwrap_or(source), limit).await?
    };

    if bytes.len() > limit {
        return Err(SourceError::TooLarge { limit });
    }

    tracing::debug!(source = %source, bytes = bytes.len(), "Fetched source");
    Ok(bytes)
}

async fn fetch_remote(url: &str, limit: usize) -> Result<Bytes, SourceError> {
    let mut response = reqwest::get(url)
        .await
        .map_err(|e| SourceError::Fetch(e.to_string()))?;

    if !response.status().is_success() {
        return Err(SourceError::Fetch(format!(
            "{} returned {}",
            url,
            response.status()
        )));
    }

    let expected = response.content_length().unwrap_or(0);
    if expected > limit as u64 {
        return Err(SourceError::TooLarge { limit });
    }

    // Content-Length may be absent or wrong; count what actually arrives
    let mut body = BytesMut::with_capacity(expected as usize);
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| SourceError::Fetch(e.to_string()))?
    {
        if body.len() + chunk.len() > limit {
            tracing::debug!(url = %url, limit = limit, "Source body over limit, aborting");
            return Err(SourceError::TooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body.freeze())
}

async fn fetch_local(path: &str, limit: usize) -> Result<Bytes, SourceError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| SourceError::Fetch(format!("{}: {}", path, e)))?;

    if metadata.len() > limit as u64 {
        return Err(SourceError::TooLarge { limit });
    }

    tokio::fs::read(path)
        .await
        .map(Bytes::from)
        .map_err(|e| SourceError::Fetch(format!("{}: {}", path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/a.gif"));
        assert!(is_remote("http://example.com/a.gif"));
        assert!(!is_remote("images/a.gif"));
        assert!(!is_remote("file:///tmp/a.gif"));
    }

    #[tokio::test]
    async fn test_fetch_local() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        tokio::fs::write(&path, b"abc").await.unwrap();

        let bytes = fetch(path.to_str().unwrap(), 16).await.unwrap();
        assert_eq!(&bytes[..], b"abc");

        let prefixed = format!("file://{}", path.display());
        assert_eq!(fetch(&prefixed, 16).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_local_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        tokio::fs::write(&path, vec![0u8; 64]).await.unwrap();

        let result = fetch(path.to_str().unwrap(), 10).await;
        assert!(matches!(result, Err(SourceError::TooLarge { limit: 10 })));
    }

    /// Serve one chunked response made of `chunks` pieces of 512 bytes
    ///
    /// `None` streams until the client goes away. Returns the URL and a
    /// handle yielding how many body bytes were written.
    async fn chunked_server(chunks: Option<usize>) -> (String, tokio::task::JoinHandle<usize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;

            let head = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n";
            if socket.write_all(head).await.is_err() {
                return 0;
            }

            let chunk = format!("200\r\n{}\r\n", "x".repeat(512));
            let mut sent = 0;
            while chunks.map_or(true, |n| sent < n * 512) && sent < 256 << 20 {
                if socket.write_all(chunk.as_bytes()).await.is_err() {
                    return sent;
                }
                sent += 512;
            }
            let _ = socket.write_all(b"0\r\n\r\n").await;
            let _ = socket.shutdown().await;
            sent
        });

        (format!("http://{}/source.gif", addr), server)
    }

    #[tokio::test]
    async fn test_fetch_remote_chunked() {
        let (url, server) = chunked_server(Some(4)).await;

        let bytes = fetch(&url, 4096).await.unwrap();
        assert_eq!(bytes.len(), 2048);
        assert!(bytes.iter().all(|&b| b == b'x'));
        assert_eq!(server.await.unwrap(), 2048);
    }

    #[tokio::test]
    async fn test_fetch_remote_endless_body_stops_at_limit() {
        let (url, server) = chunked_server(None).await;

        let result = fetch(&url, 4096).await;
        assert!(matches!(result, Err(SourceError::TooLarge { limit: 4096 })));

        // the client hung up long before the server's own cap
        let sent = server.await.unwrap();
        assert!(sent < 256 << 20);
    }

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let result = fetch("/nonexistent/framed-image/source.gif", 1024).await;
        assert!(matches!(result, Err(SourceError::Fetch(_))));
    }
}
