//! Minimal HTTP/1.1 server standing in for a Gremlin Server HTTP endpoint.
//!
//! Answers each POST with the next scripted `(status line, JSON body)` pair
//! (the last pair repeats) and records every request body it received.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Clone, Default)]
pub struct ServerLog {
    bodies: Arc<Mutex<Vec<String>>>,
}

impl ServerLog {
    pub fn bodies(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread. Returns the endpoint URL (e.g.
/// "http://127.0.0.1:12345/gremlin") and the request log.
pub fn start(responses: Vec<(&'static str, String)>) -> (String, ServerLog) {
    assert!(!responses.is_empty(), "at least one scripted response");
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let log = ServerLog::default();
    let server_log = log.clone();
    let responses = Arc::new(Mutex::new(responses));
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let log = server_log.clone();
            let responses = Arc::clone(&responses);
            thread::spawn(move || handle(stream, &log, &responses));
        }
    });
    (format!("http://127.0.0.1:{}/gremlin", port), log)
}

fn handle(mut stream: TcpStream, log: &ServerLog, responses: &Mutex<Vec<(&'static str, String)>>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let Some(body) = read_request_body(&mut stream) else {
        return;
    };
    log.bodies.lock().unwrap().push(body);

    let (status, payload) = {
        let mut responses = responses.lock().unwrap();
        if responses.len() > 1 {
            responses.remove(0)
        } else {
            responses[0].clone()
        }
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        payload.len(),
        payload
    );
    let _ = stream.write_all(response.as_bytes());
}

/// Read headers, then exactly Content-Length bytes of body.
fn read_request_body(stream: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = find(&data, b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let headers = std::str::from_utf8(&data[..header_end]).ok()?;
    let content_length = headers
        .lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while data.len() < header_end + content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }
    let end = (header_end + content_length).min(data.len());
    Some(String::from_utf8_lossy(&data[header_end..end]).into_owned())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
