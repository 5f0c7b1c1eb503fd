// Legacy REST surface
//
// Framework-agnostic routing for the legacy endpoints. An HTTP layer (or the
// line-oriented front end in main.rs) turns whatever it receives into an
// ApiRequest and writes the ApiResponse status and JSON body back.

pub mod payload;

pub use payload::{DevicePayload, QueryError, search_filters};

use crate::command::{ErrorKind, LegacyTranslator, Outcome, TranslatorError};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Prefix used by the original API, accepted but not required
const LEGACY_PREFIX: &str = "/api/1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
}

impl Method {
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Some(Method::Get),
            "PUT" => Some(Method::Put),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path without query string
    pub path: String,
    /// Decoded query pairs in order of appearance
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Split `target` (`/path?query`) into path and decoded query pairs
    pub fn from_target(method: Method, target: &str, body: Option<Value>) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let query = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(name), decode_component(value))
            })
            .collect();

        Self {
            method,
            path: path.to_string(),
            query,
            body,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Parse a request line: `METHOD /target [json body]`
    pub fn from_line(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (method, rest) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| format!("expected METHOD and target in {:?}", line))?;
        let method =
            Method::parse(method).ok_or_else(|| format!("unsupported method {:?}", method))?;
        let rest = rest.trim_start();
        let (target, body) = match rest.split_once(char::is_whitespace) {
            Some((target, body)) if !body.trim().is_empty() => {
                let body = serde_json::from_str(body.trim())
                    .map_err(|e| format!("invalid JSON body: {}", e))?;
                (target, Some(body))
            }
            Some((target, _)) => (target, None),
            None => (rest, None),
        };

        Ok(Self::from_target(method, target, body))
    }
}

/// Decode `%XX` escapes and `+` in a query component
fn decode_component(raw: &str) -> String {
    fn hex(digit: u8) -> Option<u8> {
        (digit as char).to_digit(16).map(|d| d as u8)
    }

    let bytes = raw.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => decoded.push(b' '),
            b'%' if i + 2 < bytes.len() => match (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                (Some(high), Some(low)) => {
                    decoded.push(high << 4 | low);
                    i += 2;
                }
                _ => decoded.push(b'%'),
            },
            other => decoded.push(other),
        }
        i += 1;
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn ok<T: Serialize>(body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self { status: 200, body },
            Err(e) => Self::error(500, e.to_string()),
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }
}

/// Legacy endpoint dispatcher
pub struct LegacyApi {
    translator: Arc<LegacyTranslator>,
}

impl LegacyApi {
    pub fn new(translator: Arc<LegacyTranslator>) -> Self {
        Self { translator }
    }

    pub fn translator(&self) -> &LegacyTranslator {
        &self.translator
    }

    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let path = request
            .path
            .strip_prefix(LEGACY_PREFIX)
            .unwrap_or(&request.path);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let catalogue = self.translator.catalogue();

        match (request.method, segments.as_slice()) {
            (Method::Get, ["devices"]) => match self.translator.snapshot() {
                Ok(snapshot) => ApiResponse::ok(&snapshot),
                Err(e) => ApiResponse::error(500, e.to_string()),
            },
            (Method::Put, ["device", slot]) => self.device_command(slot, request.body.as_ref()),
            (Method::Get, ["search"]) => match search_filters(&request.query) {
                Ok(filters) => ApiResponse::ok(&catalogue.search(&filters)),
                Err(e) => ApiResponse::error(400, e.to_string()),
            },
            (Method::Get, ["authors"]) => ApiResponse::ok(&catalogue.authors()),
            (Method::Get, ["contenttypes"]) => ApiResponse::ok(&catalogue.content_types()),
            (Method::Get, ["years"]) => ApiResponse::ok(&catalogue.years()),
            (Method::Get, ["audiotypes"]) => ApiResponse::ok(&catalogue.audio_types()),
            (Method::Get, ["meta"]) => ApiResponse::ok(&catalogue.metadata()),
            (
                _,
                ["devices"] | ["device", _] | ["search"] | ["authors"] | ["contenttypes"]
                | ["years"] | ["audiotypes"] | ["meta"],
            ) => ApiResponse::error(405, "method not allowed"),
            _ => ApiResponse::error(404, format!("no route for {}", request.path)),
        }
    }

    fn device_command(&self, slot: &str, body: Option<&Value>) -> ApiResponse {
        let request = slot
            .parse::<i64>()
            .map_err(|_| TranslatorError::InvalidValue {
                field: "slot",
                reason: format!("{:?} is not a number", slot),
            })
            .and_then(|slot| {
                let body = body.ok_or(TranslatorError::MissingField("body"))?;
                let payload: DevicePayload =
                    serde_json::from_value(body.clone()).map_err(|e| {
                        TranslatorError::InvalidValue {
                            field: "body",
                            reason: e.to_string(),
                        }
                    })?;
                payload.into_request(slot)
            });

        match request {
            Ok(request) => Self::respond(self.translator.submit(request)),
            // Nothing reached the device, the current state is the unchanged one
            Err(e) => Self::respond(Outcome {
                result: Err(e),
                snapshot: self.translator.snapshot().ok(),
            }),
        }
    }

    /// Client errors report the unchanged state, internal ones the message
    fn respond(outcome: Outcome) -> ApiResponse {
        let status = match &outcome.result {
            Ok(()) => 200,
            Err(e) => match e.kind() {
                ErrorKind::Validation => 400,
                ErrorKind::NotFound => 404,
                ErrorKind::Internal => return ApiResponse::error(500, e.to_string()),
            },
        };
        match outcome.snapshot {
            Some(snapshot) => {
                let mut response = ApiResponse::ok(&snapshot);
                if response.status == 200 {
                    response.status = status;
                }
                response
            }
            None => ApiResponse::error(500, TranslatorError::StatePoisoned.to_string()),
        }
    }
}
