use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};

use crate::core::{RenderError, RenderResult};

/// Gotenberg route that converts office documents through LibreOffice.
pub const LIBREOFFICE_ROUTE: &str = "/forms/libreoffice/convert";

/// Form field Gotenberg reads uploaded documents from.
pub const FILES_FIELD: &str = "files";

/// Gotenberg sniffs the real content, so one generic office extension serves
/// DOCX and ODT alike.
pub const UPLOAD_FILENAME: &str = "in.doc";

/// Turns an office document into PDF bytes.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn convert(&self, document: Vec<u8>) -> RenderResult<Bytes>;
}

/// Client for a Gotenberg instance. One attempt per call.
pub struct GotenbergConverter {
    client: reqwest::Client,
    endpoint: String,
}

impl GotenbergConverter {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        GotenbergConverter {
            client,
            endpoint: convert_endpoint(base_url),
        }
    }
}

pub fn convert_endpoint(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), LIBREOFFICE_ROUTE)
}

#[async_trait]
impl DocumentConverter for GotenbergConverter {
    async fn convert(&self, document: Vec<u8>) -> RenderResult<Bytes> {
        let part = Part::bytes(document).file_name(UPLOAD_FILENAME);
        let form = Form::new().part(FILES_FIELD, part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| RenderError::ConversionUnreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::ConversionFailed(status.to_string()));
        }

        response
            .bytes()
            .await
            .map_err(|e| RenderError::ConversionUnreachable(e.to_string()))
    }
}
