//! Firecat application layer
//!
//! Wires the shell, the stores and the home page bridge together and
//! exposes the IPC surface the driver binary serves.

pub mod bridge;
pub mod ipc;
pub mod shortcuts;
pub mod state;

pub use bridge::{SettingsBridge, VisualState};
pub use ipc::{commands::handle_message, IpcMessage, IpcResponse};
pub use state::AppState;
