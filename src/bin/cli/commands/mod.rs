pub mod config;
pub mod drop;
pub mod remote;
pub mod simulate;

use davdrop_lib::sync::Notifier;

/// Prints notices to stderr as well as the log
pub struct CliNotifier;

impl Notifier for CliNotifier {
    fn notify(&self, message: &str) {
        log::warn!("notice: {}", message);
        eprintln!("{}", message);
    }
}
