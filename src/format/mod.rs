//! Safe display markup for backend-authored content.

pub mod formatter;
pub mod links;

pub use formatter::{LINK_STYLE, MessageFormatter};
pub use links::render_links;
