use crate::core::{RenderError, RenderResult, DEFAULT_PDF_MIN_BYTES};

pub const PDF_SIGNATURE: &[u8; 5] = b"%PDF-";

/// Guards against converter output that is empty, an error page, or not a
/// PDF at all. Pass/fail only; nothing past the signature is parsed.
#[derive(Debug, Clone, Copy)]
pub struct PdfValidator {
    min_bytes: usize,
}

impl Default for PdfValidator {
    fn default() -> Self {
        PdfValidator::new(DEFAULT_PDF_MIN_BYTES)
    }
}

impl PdfValidator {
    pub fn new(min_bytes: usize) -> Self {
        PdfValidator { min_bytes }
    }

    /// Size is checked before the signature.
    pub fn validate(&self, pdf: &[u8]) -> RenderResult<()> {
        if pdf.len() < self.min_bytes {
            return Err(RenderError::PdfTooSmall {
                actual: pdf.len(),
                minimum: self.min_bytes,
            });
        }
        if !pdf.starts_with(PDF_SIGNATURE) {
            return Err(RenderError::NotPdf);
        }
        Ok(())
    }
}
