// GenAI Config - filesystem-backed agent loading, hot-reload, and the
// directory watcher that drives it.

pub mod loader;
pub mod registry;
pub mod watcher;

pub use loader::{load_agent, MAX_INCLUDE_DEPTH};
pub use registry::AgentRegistry;
pub use watcher::FileWatcher;
