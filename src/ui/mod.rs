pub mod keybindings;
pub mod pager;
pub mod window;

pub use window::GalleryWindow;
