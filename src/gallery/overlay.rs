use std::fmt;
use std::rc::Rc;

/// What a header or footer bar should show for one page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BarContent {
    /// Text to show, if any.
    pub text: Option<String>,
    /// Whether the bar carries a close button.
    pub close_button: bool,
}

impl BarContent {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            close_button: false,
        }
    }

    pub fn with_close_button(mut self) -> Self {
        self.close_button = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && !self.close_button
    }
}

pub type RenderFn = Rc<dyn Fn(usize) -> BarContent>;

/// Which side of the viewer a bar sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarSlot {
    Header,
    Footer,
}

/// Renderer for one bar, chosen once when the viewer is built.
#[derive(Clone, Default)]
pub enum BarRenderer {
    /// Built-in bar: a close button in the header, nothing in the footer.
    #[default]
    Default,
    /// Caller-supplied renderer taking the current page index.
    Custom(RenderFn),
}

impl fmt::Debug for BarRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarRenderer::Default => f.write_str("Default"),
            BarRenderer::Custom(_) => f.write_str("Custom(<closure>)"),
        }
    }
}

impl BarRenderer {
    pub fn custom<F>(render: F) -> Self
    where
        F: Fn(usize) -> BarContent + 'static,
    {
        Self::Custom(Rc::new(render))
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, BarRenderer::Custom(_))
    }

    pub fn render(&self, slot: BarSlot, image_index: usize) -> BarContent {
        match (self, slot) {
            (BarRenderer::Custom(render), _) => render(image_index),
            (BarRenderer::Default, BarSlot::Header) => BarContent::empty().with_close_button(),
            (BarRenderer::Default, BarSlot::Footer) => BarContent::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_renderers() {
        let renderer = BarRenderer::Default;
        let header = renderer.render(BarSlot::Header, 3);
        assert!(header.close_button);
        assert!(header.text.is_none());
        assert!(renderer.render(BarSlot::Footer, 3).is_empty());
    }

    #[test]
    fn test_custom_renderer_receives_index() {
        let renderer = BarRenderer::custom(|index| BarContent::text(format!("{} / 10", index + 1)));
        assert!(renderer.is_custom());
        assert_eq!(
            renderer.render(BarSlot::Footer, 4),
            BarContent::text("5 / 10")
        );
    }
}
