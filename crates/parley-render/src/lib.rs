//! Turns raw chat text into display HTML.
//!
//! Text is split lexically on triple-backtick fences into prose and code
//! segments. Code is syntax highlighted, prose is escaped and rendered as
//! Markdown with single newlines kept as line breaks. System messages skip
//! code detection entirely and render as a collapsible summary/full pair.

pub mod collapse;
pub mod highlight;
pub mod markdown;
pub mod render;
pub mod segment;

pub use collapse::{CollapseState, CollapsibleMessage};
pub use render::{RenderedBlock, RenderedBody, RenderedMessage, render_blocks, render_message};
pub use segment::{Segment, split_segments};
