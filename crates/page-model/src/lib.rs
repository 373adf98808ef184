//! Captured-page model for the domlens analyzer.
//!
//! A `Page` is a self-contained snapshot of a live document: node tree,
//! attributes, the computed-style subset the analyzer reads, bounding
//! rects, shadow roots and (nested) frame documents, plus the window
//! geometry. It also carries the host facilities the analyzer relies
//! on — paint-order hit testing standing in for `elementFromPoint`, and
//! a small mutation API used by the overlay painter.

pub mod builder;
pub mod document;
pub mod errors;
pub mod page;
pub mod style;
pub mod window;

pub use builder::{el, ElementSpec, PageBuilder};
pub use document::{Document, ElementData, FrameContent, NodeData, NodeRef, TextData};
pub use errors::PageError;
pub use page::Page;
pub use style::{
    ComputedStyle, Cursor, Display, Overflow, PointerEvents, Position, Visibility, ZIndex,
};
pub use window::Window;
