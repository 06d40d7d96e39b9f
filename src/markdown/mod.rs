pub mod link;

pub use link::{local_link, local_url, remote_link, remote_url};
