//! Error types for Horizon Outline core systems.

/// The main error type for core operations.
#[derive(Debug, thiserror::Error)]
pub enum OutlineError {
    /// Render-thread dispatch error.
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Dispatcher-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The dispatcher has been dropped; its queue no longer accepts tasks.
    #[error("The render-thread dispatcher has been dropped")]
    Closed,
    /// Another dispatcher is already installed for this thread.
    #[error("A dispatcher is already installed for thread {thread}")]
    AlreadyInstalled { thread: String },
}

/// A specialized Result type for core operations.
pub type Result<T> = std::result::Result<T, OutlineError>;
