#![forbid(unsafe_code)]

use crate::{AssistantServer, JsonRpcRequest, json_rpc_error};
use serde_json::Value;
use std::io::{BufRead, BufReader, Read, Write};

/// Framing is auto-detected once per process: either one JSON object per
/// line, or MCP-style Content-Length headers followed by a blank line and
/// a JSON body. Responses always use the framing of the request stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StdioMode {
    NewlineJson,
    ContentLength,
}

fn detect_mode(line: &str) -> Option<StdioMode> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Some(StdioMode::NewlineJson);
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("content-length:") || lower.starts_with("content-type:") {
        return Some(StdioMode::ContentLength);
    }
    None
}

fn content_length_of(line: &str) -> Option<usize> {
    let (key, value) = line.trim().split_once(':')?;
    if !key.trim().eq_ignore_ascii_case("content-length") {
        return None;
    }
    value.trim().parse::<usize>().ok()
}

fn read_frame(
    reader: &mut BufReader<std::io::StdinLock<'_>>,
    mut header: String,
) -> std::io::Result<Option<Vec<u8>>> {
    const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

    let mut content_length = content_length_of(&header);
    loop {
        if header.trim_end().is_empty() {
            break;
        }
        header.clear();
        let read = reader.read_line(&mut header)?;
        if read == 0 {
            // EOF mid-header: connection closed.
            return Ok(None);
        }
        if content_length.is_none() {
            content_length = content_length_of(&header);
        }
    }

    let Some(len) = content_length else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Missing Content-Length header",
        ));
    };
    if len > MAX_BODY_BYTES {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Content-Length exceeds max allowed size",
        ));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    Ok(Some(body))
}

fn write_response(
    stdout: &mut std::io::StdoutLock<'_>,
    mode: StdioMode,
    resp: &Value,
) -> Result<(), Box<dyn std::error::Error>> {
    match mode {
        StdioMode::NewlineJson => {
            writeln!(stdout, "{}", serde_json::to_string(resp)?)?;
        }
        StdioMode::ContentLength => {
            let body = serde_json::to_vec(resp)?;
            write!(stdout, "Content-Length: {}\r\n\r\n", body.len())?;
            stdout.write_all(&body)?;
        }
    }
    stdout.flush()?;
    Ok(())
}

fn expects_response(body: &[u8]) -> bool {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return true;
    };
    let Some(obj) = value.as_object() else {
        return true;
    };
    match obj.get("id") {
        Some(Value::Null) | None => false,
        _ => true,
    }
}

fn parse_request(body: &[u8]) -> Result<JsonRpcRequest, Value> {
    let data: Value = serde_json::from_slice(body)
        .map_err(|e| json_rpc_error(None, -32700, &format!("Parse error: {e}")))?;

    let (id, has_method) = match data.as_object() {
        Some(obj) => (obj.get("id").cloned(), obj.contains_key("method")),
        None => return Err(json_rpc_error(None, -32600, "Invalid Request")),
    };
    if !has_method {
        return Err(json_rpc_error(id, -32600, "Invalid Request"));
    }

    serde_json::from_value::<JsonRpcRequest>(data)
        .map_err(|e| json_rpc_error(id, -32600, &format!("Invalid Request: {e}")))
}

pub(crate) fn run_stdio(server: &mut AssistantServer) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let mut stdout = std::io::stdout().lock();
    let mut mode: Option<StdioMode> = None;

    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            return Ok(());
        }

        let effective_mode = match mode {
            Some(v) => v,
            None => match detect_mode(&line) {
                Some(v) => {
                    mode = Some(v);
                    v
                }
                // Blank keepalives before the first request carry no frame.
                None => continue,
            },
        };

        let body = match effective_mode {
            StdioMode::NewlineJson => {
                if line.trim().is_empty() {
                    continue;
                }
                line.into_bytes()
            }
            StdioMode::ContentLength => {
                let Some(body) = read_frame(&mut reader, line)? else {
                    return Ok(());
                };
                body
            }
        };

        let wants_response = expects_response(&body);
        let response = match parse_request(&body) {
            Ok(request) => server.handle(request),
            Err(error_resp) => Some(error_resp),
        };

        if let Some(response) = response
            && wants_response
        {
            write_response(&mut stdout, effective_mode, &response)?;
        }
    }
}
