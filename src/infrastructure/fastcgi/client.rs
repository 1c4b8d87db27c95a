use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::common::result::async_helpers::with_timeout;
use crate::common::{SwagError, SwagResult};

const VERSION: u8 = 1;
const REQUEST_ID: u16 = 1;
const ROLE_RESPONDER: u16 = 1;
const MAX_CONTENT: usize = 0xffff;

/// Script executing console commands on the PHP-FPM side
pub const CONSOLE_SCRIPT: &str = "/project/bin/fcgi-console.php";

/// FastCGI record types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordType {
    BeginRequest = 1,
    EndRequest = 3,
    Params = 4,
    Stdin = 5,
    Stdout = 6,
    Stderr = 7,
}

impl RecordType {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::BeginRequest),
            3 => Some(Self::EndRequest),
            4 => Some(Self::Params),
            5 => Some(Self::Stdin),
            6 => Some(Self::Stdout),
            7 => Some(Self::Stderr),
            _ => None,
        }
    }
}

/// Output of a completed FastCGI request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FastCgiResponse {
    pub stdout: Vec<u8>,
    pub stderr: String,
    pub app_status: u32,
}

impl FastCgiResponse {
    /// Response body with any CGI headers stripped
    pub fn body(&self) -> String {
        let raw = String::from_utf8_lossy(&self.stdout);
        match raw.split_once("\r\n\r\n") {
            Some((head, body)) if looks_like_headers(head) => body.to_string(),
            _ => raw.into_owned(),
        }
    }
}

fn looks_like_headers(head: &str) -> bool {
    head.lines().all(|line| {
        line.split_once(':')
            .map(|(name, _)| !name.is_empty() && !name.contains(' '))
            .unwrap_or(false)
    })
}

/// Minimal FastCGI client for a single request per connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastCgiClient {
    host: String,
    port: u16,
    connect_timeout_secs: u64,
}

impl FastCgiClient {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout_secs: 10,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Run a Shopware console command through PHP-FPM
    ///
    /// Anything written to stderr fails the call.
    pub async fn console(&self, args: &[String]) -> SwagResult<String> {
        let query = serde_json::to_string(args)?;
        let params = vec![
            ("REQUEST_METHOD".to_string(), "GET".to_string()),
            ("SCRIPT_FILENAME".to_string(), CONSOLE_SCRIPT.to_string()),
            ("QUERY_STRING".to_string(), query),
        ];

        let response = self.request(&params, &[]).await?;
        if !response.stderr.trim().is_empty() {
            return Err(SwagError::fastcgi_error(response.stderr.trim()));
        }
        Ok(response.body())
    }

    /// Send a request and collect its output
    pub async fn request(
        &self,
        params: &[(String, String)],
        stdin: &[u8],
    ) -> SwagResult<FastCgiResponse> {
        let address = self.address();
        tracing::debug!(%address, ?params, "fastcgi request");

        let connect = async {
            TcpStream::connect(&address).await.map_err(|e| {
                SwagError::fastcgi_error_with_source(format!("Could not connect to {}", address), e)
            })
        };
        let mut stream = with_timeout(connect, self.connect_timeout_secs).await?;

        let request = encode_request(params, stdin);
        stream
            .write_all(&request)
            .await
            .map_err(|e| SwagError::fastcgi_error_with_source("Failed to send request", e))?;

        let mut buffer = Vec::new();
        stream
            .read_to_end(&mut buffer)
            .await
            .map_err(|e| SwagError::fastcgi_error_with_source("Failed to read response", e))?;

        decode_response(&buffer)
    }
}

fn record(kind: RecordType, content: &[u8]) -> Vec<u8> {
    let padding = (8 - content.len() % 8) % 8;
    let mut out = Vec::with_capacity(8 + content.len() + padding);
    out.push(VERSION);
    out.push(kind as u8);
    out.extend_from_slice(&REQUEST_ID.to_be_bytes());
    out.extend_from_slice(&(content.len() as u16).to_be_bytes());
    out.push(padding as u8);
    out.push(0);
    out.extend_from_slice(content);
    out.resize(out.len() + padding, 0);
    out
}

/// Split a stream into records of at most 65535 bytes, closed by an empty record
fn stream_records(kind: RecordType, data: &[u8]) -> Vec<u8> {
    let mut out: Vec<u8> = data
        .chunks(MAX_CONTENT)
        .flat_map(|chunk| record(kind, chunk))
        .collect();
    out.extend(record(kind, &[]));
    out
}

fn encode_length(len: usize, out: &mut Vec<u8>) {
    if len < 128 {
        out.push(len as u8);
    } else {
        out.extend_from_slice(&((len as u32) | 0x8000_0000).to_be_bytes());
    }
}

/// Encode name-value pairs of a PARAMS stream
pub fn encode_params(params: &[(String, String)]) -> Vec<u8> {
    let mut out = Vec::new();
    for (name, value) in params {
        encode_length(name.len(), &mut out);
        encode_length(value.len(), &mut out);
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(value.as_bytes());
    }
    out
}

/// Full request: BEGIN_REQUEST, PARAMS stream, STDIN stream
pub fn encode_request(params: &[(String, String)], stdin: &[u8]) -> Vec<u8> {
    let mut begin = Vec::with_capacity(8);
    begin.extend_from_slice(&ROLE_RESPONDER.to_be_bytes());
    begin.extend_from_slice(&[0; 6]);

    let mut out = record(RecordType::BeginRequest, &begin);
    out.extend(stream_records(RecordType::Params, &encode_params(params)));
    out.extend(stream_records(RecordType::Stdin, stdin));
    out
}

/// Collect STDOUT and STDERR records up to END_REQUEST
pub fn decode_response(mut buffer: &[u8]) -> SwagResult<FastCgiResponse> {
    let mut response = FastCgiResponse::default();
    let mut stderr = Vec::new();

    while buffer.len() >= 8 {
        let kind = buffer[1];
        let length = u16::from_be_bytes([buffer[4], buffer[5]]) as usize;
        let padding = buffer[6] as usize;
        let end = 8 + length + padding;
        if buffer.len() < 8 + length {
            return Err(SwagError::fastcgi_error("Truncated record in response"));
        }
        let content = &buffer[8..8 + length];

        match RecordType::from_u8(kind) {
            Some(RecordType::Stdout) => response.stdout.extend_from_slice(content),
            Some(RecordType::Stderr) => stderr.extend_from_slice(content),
            Some(RecordType::EndRequest) => {
                if content.len() >= 4 {
                    response.app_status =
                        u32::from_be_bytes([content[0], content[1], content[2], content[3]]);
                }
                response.stderr = String::from_utf8_lossy(&stderr).into_owned();
                return Ok(response);
            }
            _ => tracing::debug!(kind, "ignoring fastcgi record"),
        }

        buffer = &buffer[end.min(buffer.len())..];
    }

    Err(SwagError::fastcgi_error("Connection closed before the request ended"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::net::TcpListener;

    #[test]
    fn test_record_header_and_padding() {
        let encoded = record(RecordType::Stdin, b"abc");
        assert_eq!(&encoded[..8], &[1, 5, 0, 1, 0, 3, 5, 0]);
        assert_eq!(encoded.len(), 16);
    }

    #[test]
    fn test_param_lengths() {
        let short = encode_params(&[("A".to_string(), "b".to_string())]);
        assert_eq!(short, vec![1, 1, b'A', b'b']);

        let long_value = "x".repeat(200);
        let long = encode_params(&[("Q".to_string(), long_value)]);
        assert_eq!(&long[..5], &[1, 0x80, 0, 0, 200]);
        assert_eq!(long.len(), 1 + 4 + 1 + 200);
    }

    #[test]
    fn test_request_layout() {
        let request = encode_request(&[("A".to_string(), "b".to_string())], &[]);
        let kinds: Vec<u8> = {
            let mut kinds = Vec::new();
            let mut rest = request.as_slice();
            while rest.len() >= 8 {
                kinds.push(rest[1]);
                let len = u16::from_be_bytes([rest[4], rest[5]]) as usize + rest[6] as usize;
                rest = &rest[8 + len..];
            }
            kinds
        };
        assert_eq!(kinds, vec![1, 4, 4, 5]);
    }

    #[test]
    fn test_decode_response() {
        let mut data = record(RecordType::Stdout, b"Content-type: text/html\r\n\r\nDone");
        data.extend(record(RecordType::Stderr, b"warning"));
        data.extend(record(RecordType::EndRequest, &[0, 0, 0, 2, 0, 0, 0, 0]));

        let response = decode_response(&data).unwrap();
        assert_eq!(response.body(), "Done");
        assert_eq!(response.stderr, "warning");
        assert_eq!(response.app_status, 2);
    }

    #[test]
    fn test_body_without_headers() {
        let response = FastCgiResponse {
            stdout: b"plain output\r\n\r\nmore".to_vec(),
            ..Default::default()
        };
        assert_eq!(response.body(), "plain output\r\n\r\nmore");
    }

    #[test]
    fn test_decode_requires_end_request() {
        let data = record(RecordType::Stdout, b"partial");
        assert!(decode_response(&data).is_err());
    }

    #[tokio::test]
    async fn test_console_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut chunk = [0u8; 1024];
            // Read until the empty STDIN record closes the request
            while !received.ends_with(&record(RecordType::Stdin, &[])) {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&chunk[..n]);
            }

            let mut reply = record(RecordType::Stdout, b"X-Powered-By: PHP\r\n\r\ncache cleared");
            reply.extend(record(RecordType::EndRequest, &[0; 8]));
            socket.write_all(&reply).await.unwrap();
            received
        });

        let client = FastCgiClient::new("127.0.0.1", port);
        let output = client
            .console(&["sw:cache:clear".to_string(), "--env=dev".to_string()])
            .await
            .unwrap();
        assert_eq!(output, "cache cleared");

        let received = server.await.unwrap();
        let haystack = String::from_utf8_lossy(&received);
        assert!(haystack.contains(CONSOLE_SCRIPT));
        assert!(haystack.contains(r#"["sw:cache:clear","--env=dev"]"#));
    }
}
