//! Room-scoped event relay
//!
//! [`RelayHub`] owns the connection registry and room table,
//! [`EventRelay`] turns typed client events into room broadcasts, and
//! [`socket`] runs one WebSocket connection against both.

pub mod dispatch;
pub mod hub;
pub mod registry;
pub mod rooms;
pub mod socket;

pub use dispatch::{EventRelay, Origin};
pub use hub::RelayHub;
