// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use std::io::Read;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tiny_http::{Header, Response, Server};

const IDLE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    status: u16,
    body: Vec<u8>,
    headers: Vec<(String, String)>,
}

impl MockResponse {
    pub fn json(status: u16, body: &Value) -> Self {
        Self::raw_json(status, &body.to_string())
    }

    pub fn raw_json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.as_bytes().to_vec(),
            headers: vec![("Content-Type".to_owned(), "application/json".to_owned())],
        }
    }

    pub fn bytes(status: u16, content_type: &str, body: &[u8]) -> Self {
        Self {
            status,
            body: body.to_vec(),
            headers: vec![("Content-Type".to_owned(), content_type.to_owned())],
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn body_json(&self) -> Result<Value> {
        serde_json::from_slice(&self.body).context("decode recorded request body")
    }
}

pub struct MockServer {
    base_url: String,
    handle: JoinHandle<Result<Vec<RecordedRequest>>>,
}

impl MockServer {
    // Serves `responses` in order, then stops. The server also stops after
    // five idle seconds so a test that sends fewer requests still finishes.
    pub fn start(responses: Vec<MockResponse>) -> Result<Self> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let base_url = format!("http://{}", server.server_addr());

        let handle = thread::spawn(move || {
            let mut recorded = Vec::new();
            for scripted in responses {
                let Some(mut request) = server
                    .recv_timeout(IDLE_TIMEOUT)
                    .context("receive mock request")?
                else {
                    break;
                };

                let mut body = Vec::new();
                request
                    .as_reader()
                    .read_to_end(&mut body)
                    .context("read mock request body")?;
                recorded.push(RecordedRequest {
                    method: request.method().to_string(),
                    url: request.url().to_owned(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|header| (header.field.to_string(), header.value.to_string()))
                        .collect(),
                    body,
                });

                let mut response =
                    Response::from_data(scripted.body).with_status_code(scripted.status);
                for (name, value) in &scripted.headers {
                    let header = Header::from_bytes(name.as_bytes(), value.as_bytes())
                        .map_err(|()| anyhow!("invalid mock header {name}"))?;
                    response = response.with_header(header);
                }
                request.respond(response).context("send mock response")?;
            }
            Ok(recorded)
        });

        Ok(Self { base_url, handle })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn finish(self) -> Result<Vec<RecordedRequest>> {
        self.handle
            .join()
            .map_err(|_| anyhow!("mock server thread panicked"))?
    }
}

#[cfg(test)]
mod tests {
    use super::{MockResponse, MockServer};
    use anyhow::Result;
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::TcpStream;

    #[test]
    fn records_requests_and_serves_script() -> Result<()> {
        let server = MockServer::start(vec![MockResponse::json(201, &json!({"ok": true}))])?;
        let address = server.base_url().trim_start_matches("http://").to_owned();

        let mut stream = TcpStream::connect(&address)?;
        write!(
            stream,
            "PUT /parametres/regions HTTP/1.1\r\nHost: {address}\r\nContent-Type: application/json\r\nContent-Length: 18\r\nConnection: close\r\n\r\n{{\"valeur\":\"Corse\"}}"
        )?;
        let mut reply = String::new();
        stream.read_to_string(&mut reply)?;
        assert!(reply.starts_with("HTTP/1.1 201"));
        assert!(reply.contains(r#"{"ok":true}"#));

        let requests = server.finish()?;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "PUT");
        assert_eq!(requests[0].url, "/parametres/regions");
        assert_eq!(requests[0].header("content-type"), Some("application/json"));
        assert_eq!(requests[0].body_json()?, json!({"valeur": "Corse"}));
        Ok(())
    }
}
