// Application layer - Session orchestration and background workers

pub mod container;
pub mod library;
pub mod session;
pub mod temp_registry;
pub mod thumbnail_scheduler;
pub mod trim_executor;

// Re-export the main entry points
pub use container::{AppContainer, DefaultAppContainer, Ports};
pub use session::TrimSession;
pub use temp_registry::TempRegistry;
pub use thumbnail_scheduler::{ThumbnailEvent, ThumbnailEvents, ThumbnailScheduler};
pub use trim_executor::TrimExecutor;
