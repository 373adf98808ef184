use domlens_core_types::Rect;

/// Window geometry of the captured page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window {
    pub inner_width: f64,
    pub inner_height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl Window {
    pub fn new(inner_width: f64, inner_height: f64) -> Self {
        Self {
            inner_width,
            inner_height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    /// The viewport rectangle in viewport coordinates.
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.inner_width, self.inner_height)
    }
}
