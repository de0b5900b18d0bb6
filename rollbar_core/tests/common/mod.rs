//! Test doubles shared by the integration tests: in-memory transports and a
//! minimal one-request-per-connection HTTP server.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use rollbar_core::transport::Transport;
use rollbar_core::{Options, TransportError};

pub fn options(capacity: usize) -> Options {
    Options {
        access_token: "test-token".into(),
        environment: "test".into(),
        endpoint: "http://collector.invalid/api/1/item/".into(),
        queue_capacity: capacity,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// In-memory transports
// ---------------------------------------------------------------------------

/// Records every body it is asked to POST.
#[derive(Clone, Default)]
pub struct Recorder {
    bodies: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl Recorder {
    pub fn bodies(&self) -> Vec<Vec<u8>> {
        self.bodies.lock().unwrap().clone()
    }

    pub fn json(&self) -> Vec<serde_json::Value> {
        self.bodies()
            .iter()
            .map(|b| serde_json::from_slice(b).unwrap())
            .collect()
    }

    pub fn titles(&self) -> Vec<String> {
        self.json()
            .iter()
            .map(|v| v["data"]["title"].as_str().unwrap().to_string())
            .collect()
    }
}

impl Transport for Recorder {
    fn post(&self, _endpoint: &str, body: &[u8]) -> Result<(), TransportError> {
        self.bodies.lock().unwrap().push(body.to_vec());
        Ok(())
    }
}

/// Signals when a POST starts, then blocks until released once per POST.
pub struct Gate {
    pub recorder: Recorder,
    entered: Sender<()>,
    release: Receiver<()>,
}

impl Gate {
    /// Returns the gate plus (entered, release) handles for the test.
    pub fn new(recorder: Recorder) -> (Self, Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = crossbeam_channel::unbounded();
        let (release_tx, release_rx) = crossbeam_channel::unbounded();
        let gate = Self {
            recorder,
            entered: entered_tx,
            release: release_rx,
        };
        (gate, entered_rx, release_tx)
    }
}

impl Transport for Gate {
    fn post(&self, endpoint: &str, body: &[u8]) -> Result<(), TransportError> {
        let _ = self.entered.send(());
        let _ = self.release.recv();
        self.recorder.post(endpoint, body)
    }
}

/// Counts attempts and fails every one of them.
#[derive(Clone, Default)]
pub struct Failing {
    pub attempts: Arc<Mutex<usize>>,
    pub panic: bool,
}

impl Transport for Failing {
    fn post(&self, _endpoint: &str, _body: &[u8]) -> Result<(), TransportError> {
        *self.attempts.lock().unwrap() += 1;
        if self.panic {
            panic!("transport exploded");
        }
        Err(TransportError::Status(503))
    }
}

// ---------------------------------------------------------------------------
// HTTP test server
// ---------------------------------------------------------------------------

pub struct Captured {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

pub struct TestServer {
    pub url: String,
    pub requests: Receiver<Captured>,
}

/// Answers every request with `status` and forwards what it received.
pub fn serve(status: u16) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/api/1/item/", listener.local_addr().unwrap());
    let (tx, rx) = crossbeam_channel::unbounded();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            if let Some(captured) = handle(stream, status) {
                if tx.send(captured).is_err() {
                    break;
                }
            }
        }
    });

    TestServer { url, requests: rx }
}

fn handle(mut stream: TcpStream, status: u16) -> Option<Captured> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        let (name, value) = line.split_once(':')?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    let find = |name: &str| {
        headers
            .iter()
            .find(|(k, _): &&(String, String)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    };

    let body = if let Some(len) = find("content-length") {
        let mut body = vec![0; len.parse().ok()?];
        reader.read_exact(&mut body).ok()?;
        body
    } else if find("transfer-encoding").is_some_and(|v| v.eq_ignore_ascii_case("chunked")) {
        read_chunked(&mut reader)?
    } else {
        Vec::new()
    };

    let reason = if status == 200 { "OK" } else { "Error" };
    let response = format!("HTTP/1.1 {status} {reason}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
    stream.write_all(response.as_bytes()).ok()?;
    stream.flush().ok()?;

    Some(Captured {
        request_line: request_line.trim_end().to_string(),
        headers,
        body,
    })
}

fn read_chunked(reader: &mut impl BufRead) -> Option<Vec<u8>> {
    let mut body = Vec::new();
    loop {
        let mut size_line = String::new();
        reader.read_line(&mut size_line).ok()?;
        let size = usize::from_str_radix(size_line.trim().split(';').next()?, 16).ok()?;
        if size == 0 {
            let mut trailer = String::new();
            reader.read_line(&mut trailer).ok()?;
            return Some(body);
        }
        let mut chunk = vec![0; size];
        reader.read_exact(&mut chunk).ok()?;
        body.extend_from_slice(&chunk);
        let mut crlf = String::new();
        reader.read_line(&mut crlf).ok()?;
    }
}
