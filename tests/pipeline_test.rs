use bytes::Bytes;
use netpeek::config::DiagConfig;
use netpeek::http::{TlsVersion, Transport};
use netpeek::pipeline::visit;
use netpeek::render::{Event, Tag};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

/// One-shot server: reads a request head and writes `response`.
async fn serve_once(response: Vec<u8>) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        socket.write_all(&response).await.unwrap();
    });
    Url::parse(&format!("http://{}/", addr)).unwrap()
}

fn response(headers: &str, body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 200 OK\r\n{}Content-Length: {}\r\n\r\n{}",
        headers,
        body.len(),
        body
    )
    .into_bytes()
}

fn ten_line_body() -> String {
    (1..=10).map(|i| format!("line {}\n", i)).collect()
}

fn transport() -> Transport {
    Transport::builder().proxy_from_env(false).build()
}

fn header_names(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Header(line) => Some(line.name.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_default_rendering_order() {
    let url = serve_once(response(
        "Server: nginx\r\nContent-Type: text/html\r\n",
        &ten_line_body(),
    ))
    .await;
    let config = DiagConfig::new(http::Method::GET, url.clone());

    let mut events = Vec::new();
    visit(&config, &transport(), &mut events).await.unwrap();

    let peer = format!("{}:{}", url.host_str().unwrap(), url.port().unwrap());
    assert_eq!(events[0], Event::Connected { peer });
    assert_eq!(events[1], Event::ConnectedVia(TlsVersion::None));
    assert_eq!(events[0].tag(), Tag::Success);
    assert_eq!(
        header_names(&events),
        vec!["Server", "Content-Length", "Content-Type"]
    );

    let body: Vec<String> = events
        .iter()
        .filter_map(|e| match e {
            Event::BodyLine(l) => Some(l.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        body,
        vec!["line 1", "line 2", "line 3", "line 4", "line 5", "line 8", "line 9", "line 10"]
    );
}

#[tokio::test]
async fn test_hop_by_hop_headers_last() {
    let url = serve_once(response(
        "Connection: keep-alive\r\nServer: nginx\r\nX-Id: 7\r\n",
        "",
    ))
    .await;
    let config = DiagConfig::new(http::Method::GET, url);

    let mut events = Vec::new();
    visit(&config, &transport(), &mut events).await.unwrap();
    assert_eq!(
        header_names(&events),
        vec!["Server", "Content-Length", "X-Id", "Connection"]
    );
}

#[tokio::test]
async fn test_connect_info_with_full_body() {
    let body = ten_line_body();
    let url = serve_once(response("Server: nginx\r\n", &body)).await;
    let mut config = DiagConfig::new(http::Method::GET, url.clone());
    config.show_connect_info = true;
    config.show_full_body = true;

    let mut events = Vec::new();
    visit(&config, &transport(), &mut events).await.unwrap();

    let text: Vec<String> = events.iter().skip(2).map(|e| e.to_string()).collect();
    let host = format!("{}:{}", url.host_str().unwrap(), url.port().unwrap());
    assert_eq!(text[0], ">GET HTTP/1.1");
    assert_eq!(text[1], format!(">Host: {}", host));
    assert!(text[2].starts_with(">User-Agent: netpeek/"));
    assert_eq!(text[3], ">Accept: */*");
    assert_eq!(text[4], "*Get response from server");
    assert_eq!(header_names(&events), vec!["Server", "Content-Length"]);
    assert_eq!(events.last(), Some(&Event::BodyFull(Bytes::from(body))));
}

#[tokio::test]
async fn test_connect_failure_emits_nothing() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = Url::parse(&format!("http://{}/", addr)).unwrap();
    let config = DiagConfig::new(http::Method::GET, url);
    let mut events = Vec::new();
    let err = visit(&config, &transport(), &mut events).await.unwrap_err();

    assert!(err.is_fatal());
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_bad_header_is_build_error() {
    let url = Url::parse("http://127.0.0.1:9/").unwrap();
    let mut config = DiagConfig::new(http::Method::GET, url);
    config.headers.push(("Bad Name".to_string(), "v".to_string()));

    let mut events = Vec::new();
    let err = visit(&config, &transport(), &mut events).await.unwrap_err();
    assert!(!err.is_fatal());
    assert!(err
        .to_string()
        .starts_with("Unable to create request GET http://127.0.0.1:9/"));
    assert!(events.is_empty());
}
