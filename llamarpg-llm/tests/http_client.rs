//! LLM client against an in-process HTTP stub.
//!
//! The stub accepts one connection, records the raw request and answers
//! with a canned status and body (or never answers at all).

use std::time::Duration;

use llamarpg_llm::extract::parse_structured;
use llamarpg_llm::{LlmClient, LlmError, LlmProvider, LlmRequest};
use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

enum Reply {
    Respond(u16, &'static str),
    Hang,
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.expect("read");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(split) = text.find("\r\n\r\n") {
            let length = text[..split]
                .lines()
                .find_map(|l| {
                    let (k, v) = l.split_once(':')?;
                    k.eq_ignore_ascii_case("content-length").then(|| v.trim().parse::<usize>().ok())?
                })
                .unwrap_or(0);
            if buf.len() >= split + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

async fn stub(reply: Reply) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let request = read_request(&mut stream).await;
        match reply {
            Reply::Respond(status, body) => {
                let head = format!(
                    "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                stream.write_all(head.as_bytes()).await.expect("write head");
                stream.write_all(body.as_bytes()).await.expect("write body");
                stream.shutdown().await.ok();
            }
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
        }
        request
    });
    (format!("http://{addr}"), handle)
}

fn client(base_url: String) -> LlmClient {
    LlmClient::new(LlmProvider::Ollama { base_url }, "llama3.2:latest")
}

#[derive(Debug, Deserialize)]
struct Pick {
    action: String,
    target: String,
    reason: String,
}

#[tokio::test]
async fn success_returns_text_and_sends_expected_body() {
    let (url, server) = stub(Reply::Respond(
        200,
        r#"{"model":"llama3.2:latest","response":"Sure: {\"action\":\"mine\",\"target\":\"iron_ore\",\"reason\":\"tools\"}","done":true,"eval_count":17}"#,
    ))
    .await;

    let request = LlmRequest::new("be json", "decide").with_timeout(2_000);
    let response = client(url).generate(&request).await.expect("generates");
    assert_eq!(response.tokens_generated, 17);
    assert_eq!(response.model, "llama3.2:latest");

    let pick: Pick = parse_structured(&response).expect("json object");
    assert_eq!(pick.action, "mine");
    assert_eq!(pick.target, "iron_ore");
    assert_eq!(pick.reason, "tools");

    let raw = server.await.expect("server");
    assert!(raw.starts_with("POST /api/generate"));
    let body = &raw[raw.find("\r\n\r\n").expect("body") + 4..];
    let sent: serde_json::Value = serde_json::from_str(body).expect("json body");
    assert_eq!(sent["model"], "llama3.2:latest");
    assert_eq!(sent["prompt"], "decide");
    assert_eq!(sent["system"], "be json");
    assert_eq!(sent["stream"], false);
    assert_eq!(sent["format"], "json");
    assert!(sent["options"]["temperature"].as_f64().is_some());
}

#[tokio::test]
async fn json_mode_off_omits_format() {
    let (url, server) = stub(Reply::Respond(200, r#"{"response":"{}"}"#)).await;
    let request = LlmRequest::new("s", "p").with_json_mode(false).with_model("tiny");
    client(url).generate(&request).await.expect("generates");
    let raw = server.await.expect("server");
    let body = &raw[raw.find("\r\n\r\n").expect("body") + 4..];
    let sent: serde_json::Value = serde_json::from_str(body).expect("json body");
    assert!(sent.get("format").is_none());
    assert_eq!(sent["model"], "tiny");
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let (url, _server) = stub(Reply::Respond(500, r#"{"error":"model not found"}"#)).await;
    let err = client(url)
        .generate(&LlmRequest::new("s", "p"))
        .await
        .expect_err("500");
    match err {
        LlmError::HttpStatus { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("model not found"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let (url, _server) = stub(Reply::Respond(200, "not json at all")).await;
    let err = client(url)
        .generate(&LlmRequest::new("s", "p"))
        .await
        .expect_err("garbage");
    assert!(matches!(err, LlmError::ParseError(_)));
}

#[tokio::test]
async fn hanging_service_times_out() {
    let (url, _server) = stub(Reply::Hang).await;
    let request = LlmRequest::new("s", "p").with_timeout(200);
    let err = client(url).generate(&request).await.expect_err("hang");
    assert!(matches!(err, LlmError::Timeout(200)));
}

#[tokio::test]
async fn refused_connection_is_not_a_success() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let err = client(format!("http://{addr}"))
        .generate(&LlmRequest::new("s", "p").with_timeout(1_000))
        .await
        .expect_err("refused");
    assert!(matches!(err, LlmError::Unavailable(_) | LlmError::RequestFailed(_)));
}
