//! Query-parameter parsing helpers.
//!
//! Handlers read raw string parameters and parse them here so that every
//! parse failure becomes a 400 INVALID_PARAMETER with a useful message,
//! rather than an extractor rejection with a shape of its own.

use std::collections::HashMap;
use std::time::Duration;

use hotpod_web::ApiError;

/// Raw query parameters.
pub type Params = HashMap<String, String>;

/// Non-empty string value for `key`, if present.
pub fn get<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

pub fn parse_duration(params: &Params, key: &str, default: Duration) -> Result<Duration, ApiError> {
    match get(params, key) {
        None => Ok(default),
        Some(v) => hotpod_config::parse_duration(v)
            .map_err(|e| ApiError::invalid_parameter(format!("invalid {key}: {e}"))),
    }
}

pub fn parse_size(params: &Params, key: &str, default: i64) -> Result<i64, ApiError> {
    match get(params, key) {
        None => Ok(default),
        Some(v) => hotpod_config::parse_size(v)
            .map_err(|e| ApiError::invalid_parameter(format!("invalid {key}: {e}"))),
    }
}

pub fn parse_int(params: &Params, key: &str, default: i64) -> Result<i64, ApiError> {
    match get(params, key) {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| ApiError::invalid_parameter(format!("{key} must be an integer"))),
    }
}

pub fn parse_float(params: &Params, key: &str, default: f64) -> Result<f64, ApiError> {
    match get(params, key) {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| ApiError::invalid_parameter(format!("{key} must be a number"))),
    }
}

pub fn parse_bool(params: &Params, key: &str, default: bool) -> Result<bool, ApiError> {
    match get(params, key) {
        None => Ok(default),
        Some("1") | Some("t") | Some("T") | Some("true") | Some("TRUE") | Some("True") => Ok(true),
        Some("0") | Some("f") | Some("F") | Some("false") | Some("FALSE") | Some("False") => {
            Ok(false)
        }
        Some(_) => Err(ApiError::invalid_parameter(format!(
            "{key} must be true or false"
        ))),
    }
}

/// Render a duration the way it appears in responses ("1s", "100ms").
pub fn fmt_duration(d: Duration) -> String {
    humantime::format_duration(d).to_string()
}

/// Render a duration rounded to milliseconds, for ages and elapsed times.
pub fn fmt_duration_ms(d: Duration) -> String {
    fmt_duration(Duration::from_millis(d.as_millis() as u64))
}
