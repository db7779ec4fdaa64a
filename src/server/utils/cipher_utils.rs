// the site wraps its link payloads in base64 -> base64 -> rot13 -> base64 -> json, decoding has
// to undo those in exactly that order or the output is garbage instead of an error
use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::{Map, Value};
use tracing::warn;

#[derive(thiserror::Error, Debug)]
pub enum CipherError {
    #[error("invalid base64 at stage {stage}: {source}")]
    InvalidBase64 {
        stage: u8,
        #[source]
        source: base64::DecodeError,
    },

    #[error("stage {stage} did not decode to utf-8")]
    InvalidUtf8 { stage: u8 },

    #[error("decoded payload is not valid json: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    #[error("decoded payload is not a json object")]
    NotAnObject,

    #[error("decoded payload is missing the '{0}' key")]
    MissingKey(String),
}

/// ROT-13, only touches ascii letters so it is its own inverse
pub fn rotate13(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'a'..='z' => (b'a' + (c as u8 - b'a' + 13) % 26) as char,
            'A'..='Z' => (b'A' + (c as u8 - b'A' + 13) % 26) as char,
            _ => c,
        })
        .collect()
}

pub fn encode_simple(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

pub fn decode_simple(text: &str) -> Result<String, CipherError> {
    base64_to_string(text, 1)
}

fn base64_to_string(text: &str, stage: u8) -> Result<String, CipherError> {
    let bytes = STANDARD
        .decode(text.trim())
        .map_err(|source| CipherError::InvalidBase64 { stage, source })?;

    String::from_utf8(bytes).map_err(|_| CipherError::InvalidUtf8 { stage })
}

pub fn try_decode_layered(blob: &str) -> Result<DecodedPayload, CipherError> {
    let first = base64_to_string(blob, 1)?;
    let second = base64_to_string(&first, 2)?;
    let rotated = rotate13(&second);
    let document = base64_to_string(&rotated, 4)?;

    match serde_json::from_str::<Value>(&document)? {
        Value::Object(map) => Ok(DecodedPayload(map)),
        _ => Err(CipherError::NotAnObject),
    }
}

/// same as [`try_decode_layered`] but swallows the reason, callers only care if it worked
pub fn decode_layered(blob: &str) -> Option<DecodedPayload> {
    match try_decode_layered(blob) {
        Ok(payload) => Some(payload),
        Err(e) => {
            warn!("failed to decode layered payload ({} chars): {}", blob.len(), e);
            None
        }
    }
}

/// inverse of [`decode_layered`], the site never needs this from us but fixtures do
pub fn encode_layered(value: &Value) -> String {
    let document = STANDARD.encode(value.to_string().as_bytes());
    let rotated = rotate13(&document);
    let second = STANDARD.encode(rotated.as_bytes());
    STANDARD.encode(second.as_bytes())
}

/// whatever json object came out of the cipher, keys are checked where they are used
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPayload(Map<String, Value>);

impl DecodedPayload {
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn require_str(&self, key: &str) -> Result<&str, CipherError> {
        self.get_str(key)
            .ok_or_else(|| CipherError::MissingKey(key.to_string()))
    }

    /// total_time shows up as both a number and a numeric string depending on the page
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
