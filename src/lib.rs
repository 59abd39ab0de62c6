//! Full-screen image gallery core: swipe paging, pinch zoom, sliding bars and
//! swipe-to-dismiss, kept headless so any toolkit can host it.

pub mod animation;
pub mod config;
pub mod gallery;
pub mod models;
pub mod scanner;

pub use config::ViewerConfig;
pub use gallery::{CloseIntent, GalleryViewer};
pub use models::ImageSource;
