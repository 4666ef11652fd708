pub mod validator;

pub use validator::{PdfValidator, PDF_SIGNATURE};
