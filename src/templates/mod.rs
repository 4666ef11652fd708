pub mod parts;
pub mod rewriter;
pub mod source;
pub mod tokens;

pub use parts::TemplatePart;
pub use rewriter::{rewrite_archive, RewriteOutcome};
pub use source::{HttpTemplateSource, TemplateSource};
pub use tokens::{substitute, SubstitutionValues, TOKENS};
