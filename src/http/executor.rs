use std::io::Read;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::request::RequestRecord;
use crate::error::{RhttpError, Result};

/// What came back, as stored in history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub status: u16,
    pub content_type: String,
    pub content_length: usize,
    #[serde(with = "super::body")]
    pub body: Vec<u8>,
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(timeout)
        .timeout_read(timeout)
        .build()
}

/// Sends `request` once. Error statuses are responses, not failures.
pub fn execute(request: &RequestRecord) -> Result<ResponseRecord> {
    let agent = build_agent(Duration::from_secs(request.timeout.max(1)));

    let mut call = agent.request(&request.method, &request.url);
    if !request.content_type.is_empty() {
        call = call.set("Content-Type", &request.content_type);
    }
    if !request.accept.is_empty() {
        call = call.set("Accept", &request.accept);
    }

    log::info!("Sending request...");
    let response = if request.body.is_empty() {
        call.call()
    } else {
        call.send_bytes(&request.body)
    };

    let response = match response {
        Ok(resp) => resp,
        Err(ureq::Error::Status(_, resp)) => resp,
        Err(ureq::Error::Transport(err)) => return Err(RhttpError::Http(err.to_string())),
    };

    let status = response.status();
    let content_type = response.header("Content-Type").unwrap_or_default().to_string();

    let mut body = Vec::new();
    response.into_reader().read_to_end(&mut body)?;
    log::info!("Received {} ({} bytes)", status, body.len());

    Ok(ResponseRecord {
        status,
        content_type,
        content_length: body.len(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: &str, url: String) -> RequestRecord {
        RequestRecord {
            method: method.to_string(),
            url,
            timeout: 5,
            content_type: "application/json".to_string(),
            accept: "*/*".to_string(),
            content_length: 0,
            body: Vec::new(),
        }
    }

    #[test]
    fn captures_response_metadata_and_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/items")
            .match_header("accept", "*/*")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items":[]}"#)
            .create();

        let resp = execute(&request("GET", format!("{}/items", server.url()))).unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.content_type, "application/json");
        assert_eq!(resp.body, br#"{"items":[]}"#);
        assert_eq!(resp.content_length, 12);
        mock.assert();
    }

    #[test]
    fn sends_body_and_content_type() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/items")
            .match_header("content-type", "application/json")
            .match_body(r#"{"x":1}"#)
            .with_status(201)
            .with_body("created")
            .create();

        let mut req = request("POST", format!("{}/items", server.url()));
        req.body = br#"{"x":1}"#.to_vec();
        req.content_length = req.body.len();
        let resp = execute(&req).unwrap();
        assert_eq!(resp.status, 201);
        assert_eq!(resp.body, b"created");
        mock.assert();
    }

    #[test]
    fn error_status_is_still_a_response() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("DELETE", "/items/7")
            .with_status(404)
            .with_body("missing")
            .create();

        let resp = execute(&request("DELETE", format!("{}/items/7", server.url()))).unwrap();
        assert_eq!(resp.status, 404);
        assert_eq!(resp.body, b"missing");
        mock.assert();
    }

    #[test]
    fn connection_failure_is_an_http_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let err = execute(&request("GET", format!("http://127.0.0.1:{port}/"))).unwrap_err();
        assert!(matches!(err, RhttpError::Http(_)));
    }
}
