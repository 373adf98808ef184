use crate::document::Document;
use crate::window::Window;

/// A captured live page: the top document plus its window geometry.
#[derive(Debug)]
pub struct Page {
    pub window: Window,
    pub document: Document,
}

impl Page {
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }
}
