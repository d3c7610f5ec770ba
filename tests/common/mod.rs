//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use quake_finder::config::{AppConfig, CitySeed};
use quake_finder::{HttpServer, Shutdown};

/// Two events near Lima and one near Tokyo, in USGS GeoJSON layout
/// (`[longitude, latitude, depth]`).
pub const SAMPLE_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": { "mag": 5.6, "place": "45 km SW of Lima, Peru", "time": 1577836800000 },
      "geometry": { "type": "Point", "coordinates": [-77.3, -12.3, 30.0] }
    },
    {
      "type": "Feature",
      "properties": { "mag": 6.1, "place": "120 km W of Callao, Peru", "time": 1578009600000 },
      "geometry": { "type": "Point", "coordinates": [-78.2, -12.0, 12.0] }
    },
    {
      "type": "Feature",
      "properties": { "mag": 5.2, "place": "near the coast of Honshu, Japan", "time": 1578182400000 },
      "geometry": { "type": "Point", "coordinates": [140.1, 35.9, 40.0] }
    }
  ]
}"#;

pub const EMPTY_GEOJSON: &str = r#"{ "type": "FeatureCollection", "features": [] }"#;

/// Start a programmable mock backend on an ephemeral port.
///
/// The handler receives the request line (e.g. `GET /query?... HTTP/1.1`)
/// and returns the status code and JSON body to send back.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let request_line = read_request_line(&mut socket).await;
                        let (status, body) = f(request_line).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Read the request head and return its first line.
async fn read_request_line(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&buf)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Configuration pointing the USGS client at `usgs_addr`, with Lima and
/// Tokyo pre-registered as cities 1 and 2.
pub fn test_config(usgs_addr: SocketAddr) -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.usgs.base_url = format!("http://{}/fdsnws/event/1/query.geojson", usgs_addr);
    config.timeouts.upstream_secs = 2;
    config.retries.base_delay_ms = 20;
    config.retries.max_delay_ms = 100;
    config.cities = vec![
        CitySeed {
            name: "Lima".into(),
            latitude: -12.0464,
            longitude: -77.0428,
        },
        CitySeed {
            name: "Tokyo".into(),
            latitude: 35.6762,
            longitude: 139.6503,
        },
    ];
    config
}

/// Start quake-finder on an ephemeral port and return its base URL.
pub async fn start_server(config: AppConfig) -> (String, Shutdown) {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();

    let shutdown = Shutdown::new();
    let handle = shutdown.clone();
    tokio::spawn(async move {
        server.run(listener, handle).await.unwrap();
    });

    (format!("http://{}", addr), shutdown)
}
