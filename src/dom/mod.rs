//! Document model for the dashboard.
//!
//! - node - typed markup tree and marker lookups
//! - document - shared mount points, wholesale swaps and targeted patches

mod document;
mod node;

pub use document::{ContainerId, Document, PatchOutcome};
pub use node::{find_element, marked_text, render_html, Element, Node, DATA_MARKER, VALUE_SLOT_CLASS};
