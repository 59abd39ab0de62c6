pub mod image_source;
pub mod session;

pub use image_source::*;
pub use session::*;
