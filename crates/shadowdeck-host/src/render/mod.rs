pub mod text;

use shadowdeck_core::render::Screen;

pub use text::TextRenderer;

pub trait FrameRenderer {
    /// Draw `screen` into `frame`, replacing its previous contents.
    fn render(&mut self, screen: Screen<'_>, frame: &mut String);
}
