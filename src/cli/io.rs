//! JSON I/O handling for CLI
//!
//! - Input: at most one JSON object via stdin
//! - Output: exactly one JSON object via stdout
//! - UTF-8 only

use std::io::{self, Read, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read a JSON request from stdin
pub fn read_request() -> CliResult<Value> {
    read_optional_request()?.ok_or_else(|| CliError::invalid_input("Empty input"))
}

/// Read a JSON request from stdin; empty input yields `None`
pub fn read_optional_request() -> CliResult<Option<Value>> {
    let mut input = String::new();
    io::stdin().lock().read_to_string(&mut input)?;
    parse_request(&input)
}

fn parse_request(input: &str) -> CliResult<Option<Value>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(input)?;
    Ok(Some(value))
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });
    write_line(&response)
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });
    write_line(&response)
}

fn write_line(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, response)
        .map_err(|e| CliError::io_error(format!("Failed to write response: {}", e)))?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_blank_is_none() {
        assert!(parse_request("  \n").unwrap().is_none());
    }

    #[test]
    fn test_parse_multiline_object() {
        let value = parse_request("{\n  \"values\": {\"1\": \"x\"}\n}\n").unwrap();
        assert_eq!(value, Some(json!({"values": {"1": "x"}})));
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(parse_request("{ nope").is_err());
    }
}
