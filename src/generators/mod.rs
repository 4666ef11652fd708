pub mod pdf;

pub use pdf::{DocumentConverter, GotenbergConverter};
