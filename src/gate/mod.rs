pub mod request_gate;

pub use request_gate::{PendingId, PendingOperation, RequestGate};
