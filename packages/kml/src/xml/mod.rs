//! XML tree and navigation utilities.

mod tree;
mod utils;

pub use tree::{parse_document, Descendants, NodeKind, XmlNode};
pub use utils::{describe, get_text, has_tag};
