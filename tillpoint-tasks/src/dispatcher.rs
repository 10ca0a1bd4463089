//! Task dispatch over the tokio runtime.

use std::future::Future;

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

/// Identifier for a dispatched task, used for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(Uuid);

impl TaskId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for task completion.
///
/// Operation-level failures never appear here: they are ordinary values in
/// the operation's own output type. This enum only covers the task itself
/// dying before it could deliver.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// The operation panicked before delivering its result.
    #[error("task panicked before delivering its result")]
    Panicked,

    /// The runtime shut down underneath the task.
    #[error("task was aborted before delivering its result")]
    Aborted,

    /// No tokio runtime is running on this thread.
    #[error("no tokio runtime is running")]
    NoRuntime,
}

/// Dispatches operations onto the tokio runtime.
///
/// The foreground context submits an operation and gets a [`TaskHandle`]
/// back; the operation runs to completion regardless of what happens to the
/// handle. Cloning is cheap; all clones dispatch onto the same runtime.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    handle: Handle,
}

impl Dispatcher {
    /// Create a dispatcher bound to the current runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    /// Use [`try_new`](Self::try_new) for a non-panicking version.
    pub fn new() -> Self {
        Self::try_new().expect("no tokio runtime is running")
    }

    /// Try to create a dispatcher bound to the current runtime.
    pub fn try_new() -> Result<Self, TaskError> {
        Handle::try_current()
            .map(|handle| Self { handle })
            .map_err(|_| TaskError::NoRuntime)
    }

    /// Submit an operation for background execution.
    ///
    /// The operation's output, typically a `Result` carrying either the
    /// success payload or a typed error, is delivered once through the
    /// returned handle. Dropping the handle detaches the task; it still runs
    /// to completion.
    pub fn submit<F, T>(&self, operation: F) -> TaskHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let id = TaskId::new();
        let span = tracing::info_span!("task", %id);
        tracing::debug!(task = %id, "background task dispatched");

        let join = self.handle.spawn(operation.instrument(span));
        TaskHandle { id, join }
    }
}

/// Handle to a dispatched operation.
///
/// Joining consumes the handle, so a result can be received at most once.
pub struct TaskHandle<T> {
    id: TaskId,
    join: JoinHandle<T>,
}

impl<T> TaskHandle<T> {
    /// The task's identifier.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Whether the operation has already finished.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the operation and take its result.
    pub async fn join(self) -> Result<T, TaskError> {
        self.join.await.map_err(|err| {
            if err.is_panic() {
                tracing::error!(task = %self.id, "background task panicked");
                TaskError::Panicked
            } else {
                TaskError::Aborted
            }
        })
    }
}

impl<T> std::fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("finished", &self.join.is_finished())
            .finish()
    }
}
