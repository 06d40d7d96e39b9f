//! Inline rendering of images stored on the WebDAV endpoint.

pub mod cache;
pub mod overlay;

pub use cache::{CachePolicy, ImageCache};
pub use overlay::{find_remote_images, ImageOverlay, InlineImage, RemoteImage};
