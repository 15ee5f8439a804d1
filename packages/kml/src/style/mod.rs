//! Style values and their asynchronous resolution.

mod resolver;
mod types;

pub use resolver::{PendingStyle, StyleIndex, StyleResolver};
pub use types::{LineStyle, Pair, PolyStyle, Style, StylePair, StyleReference, StyleSelector};
