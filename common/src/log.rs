//! Logging macros shared by every crate in the workspace.
//!
//! They are thin wrappers over `tracing` so that the CLI formatter can tell a
//! plain status line apart from a success line by its target. Callers do not
//! need their own `tracing` dependency to use them.

#[doc(hidden)]
pub use tracing;

pub const SUCCESS_TARGET: &str = "beacon::success";
pub const PRINT_TARGET: &str = "beacon::print";

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        $crate::log::tracing::info!($($arg)+)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        $crate::log::tracing::info!(target: $crate::log::SUCCESS_TARGET, $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        $crate::log::tracing::warn!($($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::log::tracing::error!($($arg)+)
    };
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
