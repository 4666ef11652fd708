use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

use crate::core::RenderError;
use crate::templates::SubstitutionValues;

/// Raw `POST /render` body, accepting every alias callers are known to send.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPayload {
    pub code: Option<String>,
    pub src_url: Option<String>,
    pub src: Option<String>,
    pub values: Option<HashMap<String, Value>>,
    pub user_values: Option<HashMap<String, Value>>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Pdf,
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            other => Err(RenderError::BadRequest(format!("unsupported format {:?}", other))),
        }
    }
}

/// A validated render request. Only constructed through
/// `TryFrom<RenderPayload>`, so every instance satisfies the input rules.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Template code, trimmed and upper-cased.
    pub code: String,
    pub source_url: String,
    pub values: SubstitutionValues,
    pub format: OutputFormat,
}

impl TryFrom<RenderPayload> for RenderRequest {
    type Error = RenderError;

    /// Precedence: `srcUrl` over `src` (an empty `srcUrl` falls through),
    /// `values` over `userValues` (any present `values` map wins, even an
    /// empty one). A missing or empty `format` means pdf.
    fn try_from(payload: RenderPayload) -> Result<Self, Self::Error> {
        let code = payload.code.unwrap_or_default().trim().to_uppercase();
        if code.is_empty() {
            return Err(RenderError::BadRequest("code is required".to_string()));
        }

        let source_url = payload
            .src_url
            .filter(|url| !url.trim().is_empty())
            .or(payload.src)
            .unwrap_or_default()
            .trim()
            .to_string();
        if source_url.is_empty() {
            return Err(RenderError::BadRequest("srcUrl is required".to_string()));
        }

        let format = match payload.format.as_deref() {
            None | Some("") => OutputFormat::Pdf,
            Some(requested) => requested.parse()?,
        };

        let values = payload
            .values
            .or(payload.user_values)
            .unwrap_or_default()
            .into_iter()
            .map(|(token, value)| (token, stringify(value)))
            .collect();

        Ok(RenderRequest {
            code,
            source_url,
            values,
            format,
        })
    }
}

fn stringify(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderResponse {
    pub ok: bool,
    pub path: String,
    pub substitutions: usize,
    pub bytes: usize,
}

impl RenderResponse {
    pub fn new(path: String, substitutions: usize, bytes: usize) -> Self {
        RenderResponse {
            ok: true,
            path,
            substitutions,
            bytes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(code: &str) -> Self {
        ErrorBody {
            ok: false,
            error: code.to_string(),
        }
    }
}
