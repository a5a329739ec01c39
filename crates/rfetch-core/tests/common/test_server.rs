//! Minimal scripted HTTP/1.1 server for integration tests.
//!
//! Each response takes the next status code and body from a sequence and then
//! keeps repeating the last one. Sequences can be set per URL path; paths
//! without their own sequence use the default one. The path and raw query of
//! the most recent request are recorded.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rfetch_core::transport::reason_phrase;

#[derive(Debug)]
struct ServerState {
    statuses: Vec<u32>,
    bodies: Vec<String>,
    statuses_by_path: HashMap<String, Vec<u32>>,
    bodies_by_path: HashMap<String, Vec<String>>,
    request_path: Option<String>,
    request_query: Option<String>,
    hits: usize,
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            statuses: vec![200],
            bodies: vec![String::new()],
            statuses_by_path: HashMap::new(),
            bodies_by_path: HashMap::new(),
            request_path: None,
            request_query: None,
            hits: 0,
        }
    }
}

/// Take the head of `seq`, dropping it unless it is the last element.
fn next_in_sequence<T: Clone>(seq: &mut Vec<T>) -> Option<T> {
    match seq.len() {
        0 => None,
        1 => Some(seq[0].clone()),
        _ => Some(seq.remove(0)),
    }
}

impl ServerState {
    fn respond(&mut self, path: &str, query: Option<&str>) -> (u32, String) {
        self.hits += 1;
        self.request_path = Some(path.to_string());
        self.request_query = query.map(str::to_string);
        let status = match self.statuses_by_path.get_mut(path) {
            Some(seq) => next_in_sequence(seq),
            None => next_in_sequence(&mut self.statuses),
        };
        let body = match self.bodies_by_path.get_mut(path) {
            Some(seq) => next_in_sequence(seq),
            None => next_in_sequence(&mut self.bodies),
        };
        (status.unwrap_or(200), body.unwrap_or_default())
    }
}

pub struct TestServer {
    base_url: String,
    state: Arc<Mutex<ServerState>>,
}

#[allow(dead_code)]
impl TestServer {
    /// Starts a server in a background thread; it runs until the process exits.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(ServerState::default()));
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&shared);
                thread::spawn(move || handle(stream, &state));
            }
        });
        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    /// Base URL without trailing slash, e.g. `http://127.0.0.1:12345`.
    pub fn url(&self) -> &str {
        &self.base_url
    }

    pub fn set_statuses(&self, statuses: &[u32]) {
        self.state.lock().unwrap().statuses = statuses.to_vec();
    }

    pub fn set_bodies(&self, bodies: &[&str]) {
        self.state.lock().unwrap().bodies = bodies.iter().map(|b| b.to_string()).collect();
    }

    pub fn set_path_statuses(&self, path: &str, statuses: &[u32]) {
        self.state
            .lock()
            .unwrap()
            .statuses_by_path
            .insert(path.to_string(), statuses.to_vec());
    }

    pub fn set_path_bodies(&self, path: &str, bodies: &[&str]) {
        self.state.lock().unwrap().bodies_by_path.insert(
            path.to_string(),
            bodies.iter().map(|b| b.to_string()).collect(),
        );
    }

    pub fn request_path(&self) -> Option<String> {
        self.state.lock().unwrap().request_path.clone()
    }

    pub fn request_query(&self) -> Option<String> {
        self.state.lock().unwrap().request_query.clone()
    }

    /// Number of requests served so far.
    pub fn hits(&self) -> usize {
        self.state.lock().unwrap().hits
    }
}

fn handle(mut stream: TcpStream, state: &Mutex<ServerState>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    let request = String::from_utf8_lossy(&request);
    let target = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");
    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (target, None),
    };

    let (status, body) = state.lock().unwrap().respond(path, query);
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nContent-Type: text/plain\r\nConnection: close\r\n\r\n{}",
        status,
        reason_phrase(status),
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}
