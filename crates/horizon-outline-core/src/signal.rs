//! Signal/slot system for Horizon Outline.
//!
//! Signals are the publish-on-change mechanism that keeps the outline view
//! consistent with the state it projects. Expansion stores, selection models
//! and nodes own signals; the view connects slots to them and reacts to every
//! write before its next paint.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The main signal type for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`ConnectionType`] - How a slot should be invoked (Direct, Queued, Auto)
//!
//! # Connection Types
//!
//! - **Direct**: Slot is called immediately in the emitting thread
//! - **Queued**: Slot execution is posted to the connecting thread's
//!   [`Dispatcher`](crate::Dispatcher)
//! - **Auto**: Direct if same thread, Queued otherwise (default)
//!
//! # Thread Safety
//!
//! When a slot is connected from the render thread and the signal is emitted
//! from a background thread, an `Auto` connection hops back onto the render
//! thread through its installed dispatcher. Without an installed dispatcher the
//! slot runs immediately on the emitting thread and a warning is logged.
//!
//! Slots are invoked after the connection table lock is released, so a slot
//! may freely connect, disconnect or emit on the same signal.
//!
//! # Example
//!
//! ```
//! use horizon_outline_core::Signal;
//!
//! let text_changed = Signal::<String>::new();
//!
//! let conn_id = text_changed.connect(|text| {
//!     println!("Text changed to: {}", text);
//! });
//!
//! text_changed.emit("Hello, World!".to_string());
//! text_changed.disconnect(conn_id);
//! ```

use std::sync::Arc;
use std::thread::ThreadId;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::dispatcher;
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    pub struct ConnectionId;
}

/// Specifies how a connected slot should be invoked when the signal is emitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionType {
    /// Invoke the slot immediately in the emitting thread.
    Direct,

    /// Post the slot invocation to the connecting thread's dispatcher.
    ///
    /// The slot runs when the render loop next processes its task queue,
    /// even if the signal was emitted on that same thread.
    Queued,

    /// Direct when emitted on the connecting thread, Queued otherwise.
    #[default]
    Auto,
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Internal storage for a single connection.
struct Connection<Args> {
    slot: Slot<Args>,
    connection_type: ConnectionType,
    /// The thread this connection was created on.
    target_thread: ThreadId,
}

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a tuple for multiple arguments.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
}

impl<Args: Clone + Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().len())
            .finish()
    }
}

impl<Args: Clone + Send + 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Connect a slot (closure) to this signal using [`ConnectionType::Auto`].
    ///
    /// # Example
    ///
    /// ```
    /// use horizon_outline_core::Signal;
    ///
    /// let signal = Signal::<String>::new();
    /// let id = signal.connect(|s| println!("Got: {}", s));
    /// signal.emit("Hello".to_string());
    /// ```
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connect_with_type(slot, ConnectionType::Auto)
    }

    /// Connect a slot with a specific connection type.
    pub fn connect_with_type<F>(&self, slot: F, connection_type: ConnectionType) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let connection = Connection {
            slot: Arc::new(slot),
            connection_type,
            target_thread: std::thread::current().id(),
        };
        self.connections.lock().insert(connection)
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Emit the signal, invoking all connected slots.
    ///
    /// Direct invocations have all completed when this returns. Queued
    /// invocations have been posted to their target dispatcher.
    #[tracing::instrument(skip_all, target = "horizon_outline_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        let current_thread = std::thread::current().id();
        let snapshot: Vec<(Slot<Args>, ConnectionType, ThreadId)> = {
            let connections = self.connections.lock();
            connections
                .values()
                .map(|conn| (conn.slot.clone(), conn.connection_type, conn.target_thread))
                .collect()
        };
        tracing::trace!(target: targets::SIGNAL, connection_count = snapshot.len(), "emitting signal");

        for (slot, connection_type, target_thread) in snapshot {
            match connection_type {
                ConnectionType::Direct => slot(&args),
                ConnectionType::Auto if target_thread == current_thread => slot(&args),
                ConnectionType::Auto | ConnectionType::Queued => {
                    Self::queue_invocation(target_thread, slot, args.clone());
                }
            }
        }
    }

    /// Post an invocation to the dispatcher installed on `target_thread`.
    fn queue_invocation(target_thread: ThreadId, slot: Slot<Args>, args: Args) {
        let Some(handle) = dispatcher::handle_for_thread(target_thread) else {
            // No render loop for that thread, e.g. during tests or start-up.
            tracing::warn!(
                target: targets::SIGNAL,
                "no dispatcher installed for target thread, executing immediately"
            );
            slot(&args);
            return;
        };

        if let Err(err) = handle.post(move || slot(&args)) {
            crate::outline_warn!(error = %err, "failed to queue slot invocation");
        }
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
