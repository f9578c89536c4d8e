//! Raw-socket servers for failure cases a mock server cannot produce.

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve one response that promises 100000 bytes but sends only 10, then
/// either hangs up or keeps the connection open for `hold`.
pub async fn serve_short_body(hold: Option<Duration>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100000\r\n\r\n0123456789")
            .await
            .unwrap();
        socket.flush().await.unwrap();
        if let Some(hold) = hold {
            tokio::time::sleep(hold).await;
        }
    });

    format!("http://{}/file.txt", addr)
}
