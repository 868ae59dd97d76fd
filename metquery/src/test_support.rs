//! Test-only helpers: a one-shot HTTP responder standing in for metquery.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use reqwest::blocking::Client;

use crate::client::MetqueryClient;
use crate::config::MetqueryConfig;

/// Serves exactly one canned response on a loopback port.
pub struct CannedServer {
    pub base_url: String,
    handle: JoinHandle<String>,
}

impl CannedServer {
    pub fn start(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        let content_length = body.len();
        Self::serve(status, body, content_length)
    }

    /// Announce `content_length` bytes but send only `body`, then hang up.
    pub fn start_truncated(status: u16, body: impl Into<Vec<u8>>, content_length: usize) -> Self {
        Self::serve(status, body.into(), content_length)
    }

    fn serve(status: u16, body: Vec<u8>, content_length: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut request_line = String::new();
            reader
                .read_line(&mut request_line)
                .expect("read request line");
            loop {
                let mut header = String::new();
                let n = reader.read_line(&mut header).expect("read header");
                if n == 0 || header == "\r\n" {
                    break;
                }
            }

            let head = format!(
                "HTTP/1.1 {status} Canned\r\nContent-Length: {content_length}\r\nConnection: close\r\n\r\n"
            );
            stream.write_all(head.as_bytes()).expect("write head");
            stream.write_all(&body).expect("write body");
            stream.flush().expect("flush");
            request_line.trim_end().to_string()
        });

        Self {
            base_url: format!("http://{addr}/metquery/"),
            handle,
        }
    }

    /// Client pointed at this server, bypassing any proxy settings.
    pub fn client(&self) -> MetqueryClient {
        let config = MetqueryConfig {
            base_url: self.base_url.clone(),
            timeout_secs: Some(10),
        };
        let http = Client::builder().no_proxy().build().expect("http client");
        MetqueryClient::with_http_client(&config, http).expect("metquery client")
    }

    /// Wait for the request and return its request line (`GET /path?query HTTP/1.1`).
    pub fn request_line(self) -> String {
        self.handle.join().expect("server thread")
    }
}

/// JSON body with `values` under `MonthlyValues`.
pub fn monthly_body(values: &[f64]) -> String {
    serde_json::json!({ "MonthlyValues": values }).to_string()
}
