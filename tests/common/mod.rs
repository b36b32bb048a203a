//! Shared fixtures for integration tests

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve `body` with `status` to every request; returns the base URL
pub async fn serve(status: u16, body: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = body.to_string();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let body = body.clone();
            tokio::spawn(async move {
                // Read until the end of the request headers
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let response = format!(
                    "HTTP/1.1 {} Fixture\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}/gdp.html", addr)
}

/// A page shaped like the source: two unrelated tables, then the GDP table
pub fn gdp_page(rows: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head><title>GDP</title></head>
<body>
<table class="box"><tbody><tr><td>Notice</td></tr></tbody></table>
<table class="legend"><tbody><tr><td><a href="/x">Legend</a></td><td>a</td><td>1</td></tr></tbody></table>
<table class="wikitable"><tbody>
<tr><th>Country/Territory</th><th>UN region</th><th>IMF<sup>[1]</sup></th><th>Year</th></tr>
{}
</tbody></table>
</body></html>"#,
        rows
    )
}

pub fn row(country: &str, gdp: &str) -> String {
    format!(
        "<tr><td><a href=\"/wiki/{0}\">{0}</a></td><td>Region</td><td>{1}</td><td>2023</td></tr>",
        country, gdp
    )
}
