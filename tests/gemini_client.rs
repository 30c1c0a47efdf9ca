//! Tests for the Gemini client against a local one-shot HTTP responder.

use forge::chat::client::FALLBACK_REPLY;
use forge::chat::{ChatError, CompletionClient, GeminiClient};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;

/// Request as seen by the responder.
struct Captured {
    request_line: String,
    body: String,
}

/// Serve exactly one request with `status` and `body`, returning the base
/// URL and a receiver for what the client sent.
fn serve_once(status: &'static str, body: &'static str) -> (String, mpsc::Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut content_length = 0;
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).unwrap();
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
        }

        let mut request_body = vec![0; content_length];
        reader.read_exact(&mut request_body).unwrap();

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
        stream.flush().unwrap();

        tx.send(Captured {
            request_line: request_line.trim_end().to_string(),
            body: String::from_utf8(request_body).unwrap(),
        })
        .unwrap();
    });

    (format!("http://{addr}/"), rx)
}

fn client(base_url: &str) -> GeminiClient {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    GeminiClient::with_http(http, base_url, "gemini-1.5-flash")
}

#[tokio::test]
async fn returns_first_candidate_text() {
    let (url, rx) = serve_once(
        "200 OK",
        r#"{"candidates":[{"content":{"parts":[{"text":"Focus on X"}]}}]}"#,
    );

    let reply = client(&url).complete("What first?", "secret").await.unwrap();
    assert_eq!(reply, "Focus on X");

    let captured = rx.recv().unwrap();
    assert!(captured.request_line.starts_with("POST /v1beta/models/gemini-1.5-flash:generateContent?key=secret"));
    let body: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(body["contents"][0]["parts"][0]["text"], "What first?");
}

#[tokio::test]
async fn non_success_status_is_an_api_error() {
    let (url, _rx) = serve_once("500 Internal Server Error", r#"{"error":"down"}"#);

    let err = client(&url).complete("hi", "secret").await.unwrap_err();
    match err {
        ChatError::Api { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("down"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let (url, _rx) = serve_once("200 OK", "not json");

    let err = client(&url).complete("hi", "secret").await.unwrap_err();
    assert!(matches!(err, ChatError::Parse(_)));
}

#[tokio::test]
async fn missing_reply_field_uses_fallback() {
    let (url, _rx) = serve_once("200 OK", r#"{"candidates":[]}"#);

    let reply = client(&url).complete("hi", "secret").await.unwrap();
    assert_eq!(reply, FALLBACK_REPLY);
}
