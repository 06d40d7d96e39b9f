//! Upload files dropped into markdown notes to a WebDAV server and link to
//! the remote copy.

pub mod markdown;
pub mod preview;
pub mod sync;
