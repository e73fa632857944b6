//! CLI command implementations

pub mod annotate;
pub mod comment;
pub mod context;

pub use annotate::AnnotateArgs;
pub use comment::CommentArgs;
pub use context::ContextArgs;

use std::io::Read;

/// Read an input argument: a file path, or stdin when it is "-"
pub(crate) fn read_input(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(source)?)
    }
}
