use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::counters::Counters;
use common::err::CResult;
use storage::Storage;
use tracing::{debug, warn};

use crate::receiver::Receiver;

const MAX_REQUEST_LINE: usize = 8 * 1024;
const MAX_BODY: usize = 1024 * 1024;
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Minimal single-request-per-connection HTTP/1.1 front. No keep-alive,
/// no chunked transfer encoding, no pipelining — every accepted
/// connection serves exactly one request and is then closed.
pub struct HttpReceiver {
    port: u16,
    listener: Option<TcpListener>,
    storage: Arc<Mutex<Storage>>,
    counters: Arc<Counters>,
}

impl HttpReceiver {
    pub fn new(port: u16, storage: Arc<Mutex<Storage>>, counters: Arc<Counters>) -> Self {
        HttpReceiver {
            port,
            listener: None,
            storage,
            counters,
        }
    }
}

impl Receiver for HttpReceiver {
    fn name(&self) -> &'static str {
        "http"
    }

    fn start(&mut self) -> CResult<()> {
        let listener = TcpListener::bind(("0.0.0.0", self.port)).map_err(common::err::CoreError::Io)?;
        listener.set_nonblocking(true).map_err(common::err::CoreError::Io)?;
        self.listener = Some(listener);
        tracing::info!(receiver = "http", port = self.port, "receiver bound");
        Ok(())
    }

    fn poll_once(&self) -> bool {
        let Some(listener) = &self.listener else {
            return false;
        };

        match listener.accept() {
            Ok((stream, _addr)) => {
                handle_connection(stream, &self.storage, &self.counters);
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => false,
            Err(e) => {
                warn!(error = %e, "accept failed");
                false
            }
        }
    }

    fn stop(&mut self) {
        self.listener = None;
    }
}

struct ParsedRequest {
    method: String,
    path: String,
    body: Vec<u8>,
}

fn handle_connection(mut stream: TcpStream, storage: &Arc<Mutex<Storage>>, counters: &Arc<Counters>) {
    let _ = stream.set_read_timeout(Some(READ_TIMEOUT));
    let _ = stream.set_write_timeout(Some(READ_TIMEOUT));

    let request = match read_request(&mut stream) {
        Ok(r) => r,
        Err(_) => {
            write_response(&mut stream, 400, br#"{"error":"Bad Request"}"#);
            return;
        }
    };

    let (status, body): (u16, Vec<u8>) = match (request.method.as_str(), request.path.as_str()) {
        ("POST", "/api/logs") => handle_post_logs(&request.body, storage, counters),
        ("GET", "/api/logs") => handle_get_logs(storage),
        ("GET", "/health") => (200, br#"{"status":"ok"}"#.to_vec()),
        _ => (404, br#"{"error":"Not Found"}"#.to_vec()),
    };

    write_response(&mut stream, status, &body);
}

fn handle_post_logs(body: &[u8], storage: &Arc<Mutex<Storage>>, counters: &Arc<Counters>) -> (u16, Vec<u8>) {
    if serde_json::from_slice::<serde_json::Value>(body).is_err() {
        return (400, br#"{"error":"Invalid JSON"}"#.to_vec());
    }

    let entry = match ingest::json::extract(body) {
        Ok(e) => e,
        Err(_) => return (400, br#"{"error":"Invalid JSON"}"#.to_vec()),
    };

    let mut guard = storage.lock().unwrap();
    match guard.insert(&entry) {
        Ok(id) => {
            counters.add_received(1);
            counters.add_written(1);
            (201, format!(r#"{{"id":{id},"status":"created"}}"#).into_bytes())
        }
        Err(e) => {
            warn!(error = %e, "http insert failed");
            counters.add_error();
            (500, br#"{"error":"Storage Error"}"#.to_vec())
        }
    }
}

fn handle_get_logs(storage: &Arc<Mutex<Storage>>) -> (u16, Vec<u8>) {
    let guard = storage.lock().unwrap();
    match guard.get_log_count() {
        Ok(count) => (200, format!(r#"{{"count":{count}}}"#).into_bytes()),
        Err(e) => {
            warn!(error = %e, "http count query failed");
            (500, br#"{"error":"Storage Error"}"#.to_vec())
        }
    }
}

/// Reads the request line and headers byte-by-byte up to the blank line,
/// then reads exactly `Content-Length` more bytes as the body.
fn read_request(stream: &mut TcpStream) -> Result<ParsedRequest, ()> {
    let mut header_bytes = Vec::new();
    let mut one = [0u8; 1];

    loop {
        if header_bytes.len() > MAX_REQUEST_LINE {
            return Err(());
        }
        match stream.read(&mut one) {
            Ok(0) => return Err(()),
            Ok(_) => header_bytes.push(one[0]),
            Err(_) => return Err(()),
        }
        if header_bytes.ends_with(b"\r\n\r\n") {
            break;
        }
    }

    let header_text = std::str::from_utf8(&header_bytes).map_err(|_| ())?;
    let mut lines = header_text.split("\r\n");
    let request_line = lines.next().ok_or(())?;

    let mut parts = request_line.split(' ');
    let method = parts.next().ok_or(())?.to_string();
    let path = parts.next().ok_or(())?.to_string();
    parts.next().ok_or(())?; // HTTP version, unchecked

    let mut content_length = 0usize;
    for line in lines {
        if line.is_empty() {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().map_err(|_| ())?;
            }
        }
    }

    if content_length > MAX_BODY {
        return Err(());
    }

    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        stream.read_exact(&mut body).map_err(|_| ())?;
    }

    debug!(method = %method, path = %path, len = content_length, "http request parsed");
    Ok(ParsedRequest { method, path, body })
}

fn write_response(stream: &mut TcpStream, status: u16, body: &[u8]) {
    let reason = match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    };

    let header = format!(
        "HTTP/1.1 {status} {reason}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n",
        body.len()
    );

    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;

    fn test_storage() -> (Arc<Mutex<Storage>>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(Mutex::new(Storage::open(dir.path().join("logs.db")).unwrap()));
        (storage, dir)
    }

    fn fire_request(port: u16, raw: &str) -> (u16, String) {
        let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
        stream.write_all(raw.as_bytes()).unwrap();

        let mut reader = std::io::BufReader::new(stream);
        let mut status_line = String::new();
        reader.read_line(&mut status_line).unwrap();
        let status: u16 = status_line.split(' ').nth(1).unwrap().parse().unwrap();

        let mut rest = String::new();
        reader.read_to_string(&mut rest).unwrap();
        let body = rest.rsplit("\r\n\r\n").next().unwrap_or("").to_string();
        (status, body)
    }

    #[test]
    fn health_check_returns_ok() {
        let (storage, _dir) = test_storage();
        let counters = Arc::new(Counters::new());
        let mut recv = HttpReceiver::new(0, storage, counters);
        recv.start().unwrap();
        let port = recv.listener.as_ref().unwrap().local_addr().unwrap().port();

        let client = std::thread::spawn(move || fire_request(port, "GET /health HTTP/1.1\r\nHost: x\r\n\r\n"));
        std::thread::sleep(Duration::from_millis(50));
        assert!(recv.poll_once());

        let (status, body) = client.join().unwrap();
        assert_eq!(status, 200);
        assert!(body.contains("\"status\":\"ok\""));
    }

    #[test]
    fn post_logs_inserts_and_returns_created_id() {
        let (storage, _dir) = test_storage();
        let counters = Arc::new(Counters::new());
        let mut recv = HttpReceiver::new(0, storage.clone(), counters);
        recv.start().unwrap();
        let port = recv.listener.as_ref().unwrap().local_addr().unwrap().port();

        let payload = r#"{"message":"hello","level":"info"}"#;
        let request = format!(
            "POST /api/logs HTTP/1.1\r\nHost: x\r\nContent-Length: {}\r\n\r\n{}",
            payload.len(),
            payload
        );

        let client = std::thread::spawn(move || fire_request(port, &request));
        std::thread::sleep(Duration::from_millis(50));
        assert!(recv.poll_once());

        let (status, body) = client.join().unwrap();
        assert_eq!(status, 201);
        assert!(body.contains("\"status\":\"created\""));
        assert_eq!(storage.lock().unwrap().get_log_count().unwrap(), 1);
    }

    #[test]
    fn unknown_path_is_not_found() {
        let (storage, _dir) = test_storage();
        let counters = Arc::new(Counters::new());
        let mut recv = HttpReceiver::new(0, storage, counters);
        recv.start().unwrap();
        let port = recv.listener.as_ref().unwrap().local_addr().unwrap().port();

        let client = std::thread::spawn(move || fire_request(port, "GET /nope HTTP/1.1\r\nHost: x\r\n\r\n"));
        std::thread::sleep(Duration::from_millis(50));
        assert!(recv.poll_once());

        let (status, _body) = client.join().unwrap();
        assert_eq!(status, 404);
    }
}
