//! Notification fan-out: message-bus publish plus WebSocket broadcast.
//!
//! Both delivery channels are best-effort. A failure on either channel is
//! logged and isolated; it never reaches the mutation that triggered the
//! announcement.

pub mod bus;
pub mod fanout;
pub mod registry;

pub use bus::{BusError, MessageBus, NatsBus};
pub use fanout::Notifier;
pub use registry::{ConnectionId, ConnectionRegistry};
