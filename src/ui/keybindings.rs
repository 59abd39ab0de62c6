// Keybindings for the lightbox gallery
//
// Keybindings:
// - Left / h / Page_Up: Previous image
// - Right / l / Page_Down / space: Next image
// - Home / End: First / last image
// - +, =, -: Zoom in / out
// - 0: Reset zoom
// - Escape / q / BackSpace: Close (treated like the platform back button)

use gdk4::Key;
use gtk4::prelude::*;
use gtk4::{EventControllerKey, PropagationPhase, Widget};
use std::cell::RefCell;
use std::rc::Rc;

/// Zoom factor applied per key press.
pub const KEY_ZOOM_STEP: f64 = 1.25;

/// Gallery command produced by a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryAction {
    PreviousPage,
    NextPage,
    FirstPage,
    LastPage,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    Close,
}

impl GalleryAction {
    /// Target page for paging actions, `None` for the rest or when the
    /// gallery is empty.
    pub fn target_page(self, current: usize, count: usize) -> Option<usize> {
        if count == 0 {
            return None;
        }
        let last = count - 1;
        match self {
            GalleryAction::PreviousPage => Some(current.saturating_sub(1).min(last)),
            GalleryAction::NextPage => Some((current + 1).min(last)),
            GalleryAction::FirstPage => Some(0),
            GalleryAction::LastPage => Some(last),
            _ => None,
        }
    }

    /// Relative zoom factor for the step zoom actions.
    pub fn zoom_factor(self) -> Option<f64> {
        match self {
            GalleryAction::ZoomIn => Some(KEY_ZOOM_STEP),
            GalleryAction::ZoomOut => Some(1.0 / KEY_ZOOM_STEP),
            _ => None,
        }
    }
}

pub fn action_for_key(keyval: Key) -> Option<GalleryAction> {
    match keyval {
        Key::Left | Key::h | Key::Page_Up => Some(GalleryAction::PreviousPage),
        Key::Right | Key::l | Key::Page_Down | Key::space => Some(GalleryAction::NextPage),
        Key::Home => Some(GalleryAction::FirstPage),
        Key::End => Some(GalleryAction::LastPage),
        Key::plus | Key::equal | Key::KP_Add => Some(GalleryAction::ZoomIn),
        Key::minus | Key::KP_Subtract => Some(GalleryAction::ZoomOut),
        Key::_0 | Key::KP_0 => Some(GalleryAction::ResetZoom),
        Key::Escape | Key::q | Key::BackSpace => Some(GalleryAction::Close),
        _ => None,
    }
}

/// Callback type for gallery actions
pub type ActionCallback = Box<dyn Fn(GalleryAction)>;

/// Keybinding manager for the gallery window
pub struct Keybindings {
    controller: EventControllerKey,
    on_action: Rc<RefCell<Option<ActionCallback>>>,
}

impl Keybindings {
    pub fn new() -> Self {
        let controller = EventControllerKey::new();
        controller.set_propagation_phase(PropagationPhase::Capture);

        let on_action: Rc<RefCell<Option<ActionCallback>>> = Rc::new(RefCell::new(None));
        let on_action_clone = on_action.clone();

        controller.connect_key_pressed(move |_controller, keyval, _keycode, _state| {
            let Some(action) = action_for_key(keyval) else {
                return glib::Propagation::Proceed;
            };
            tracing::trace!(?action, "Key action");
            if let Some(ref callback) = *on_action_clone.borrow() {
                callback(action);
                glib::Propagation::Stop
            } else {
                glib::Propagation::Proceed
            }
        });

        Self {
            controller,
            on_action,
        }
    }

    /// Attach keybindings to a widget (typically the gallery window)
    pub fn attach(&self, widget: &impl IsA<Widget>) {
        widget.add_controller(self.controller.clone());
    }

    pub fn connect_action<F>(&self, callback: F)
    where
        F: Fn(GalleryAction) + 'static,
    {
        *self.on_action.borrow_mut() = Some(Box::new(callback));
    }
}

impl Default for Keybindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(action_for_key(Key::Left), Some(GalleryAction::PreviousPage));
        assert_eq!(action_for_key(Key::l), Some(GalleryAction::NextPage));
        assert_eq!(action_for_key(Key::Escape), Some(GalleryAction::Close));
        assert_eq!(action_for_key(Key::q), Some(GalleryAction::Close));
        assert_eq!(action_for_key(Key::_0), Some(GalleryAction::ResetZoom));
        assert_eq!(action_for_key(Key::a), None);
    }

    #[test]
    fn test_target_page_clamps() {
        assert_eq!(GalleryAction::PreviousPage.target_page(0, 3), Some(0));
        assert_eq!(GalleryAction::NextPage.target_page(2, 3), Some(2));
        assert_eq!(GalleryAction::NextPage.target_page(1, 3), Some(2));
        assert_eq!(GalleryAction::LastPage.target_page(0, 3), Some(2));
        assert_eq!(GalleryAction::FirstPage.target_page(2, 3), Some(0));
        assert_eq!(GalleryAction::NextPage.target_page(0, 0), None);
        assert_eq!(GalleryAction::Close.target_page(0, 3), None);
    }

    #[test]
    fn test_zoom_factor() {
        assert_eq!(GalleryAction::ZoomIn.zoom_factor(), Some(KEY_ZOOM_STEP));
        assert_eq!(GalleryAction::ZoomOut.zoom_factor(), Some(1.0 / KEY_ZOOM_STEP));
        assert_eq!(GalleryAction::ResetZoom.zoom_factor(), None);
        assert_eq!(GalleryAction::NextPage.zoom_factor(), None);
    }
}
