//! Live reload for `watch`.
//!
//! The [`FileWatcher`] reports changes below the stack, the command rebuilds,
//! and the [`ReloadHub`] pushes the outcome to every browser connected to
//! the [`ReloadServer`] as a Server-Sent Event:
//!
//! ```text
//! data: {"success":false,"errors":[{"text":"Could not resolve 'x'"}],"warnings":[]}
//! ```

mod hub;
mod message;
mod server;
mod watcher;

pub use hub::{ClientRetention, ClientStream, ReloadHub};
pub use message::ReloadMessage;
pub use server::{DEFAULT_ADDR, ReloadServer};
pub use watcher::{FileChange, FileWatcher, IGNORED_DIRS, next_batch};
