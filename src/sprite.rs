use crate::renderer::{Rect, Surface};
use crate::scene::{Draw, Local};

/// Draw hook filling the node's box with a flat color
/// - draws in node space, so (0, 0) is the top left corner after the anchor offset
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    color: String,
}

impl Sprite {
    pub fn new(color: impl Into<String>) -> Self {
        Sprite {
            color: color.into(),
        }
    }

    pub fn color(&self) -> &str {
        &self.color
    }
}

impl Draw for Sprite {
    fn draw(&self, surface: &mut dyn Surface, local: &Local) {
        surface.fill_rect(&Rect::new(0.0, 0.0, local.width, local.height), &self.color);
    }
}
