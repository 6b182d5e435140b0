//! Inbound webhook handling: HMAC signature verification and event dispatch.
//!
//! The verifier must pass before anything looks at the payload; the
//! dispatcher tolerates event types it has never heard of, since the peer
//! controls the event catalog and adds types without notice.

pub mod dispatch;
pub mod signature;

pub use {
    dispatch::{EventKind, dispatch},
    signature::{sign, verify_signature},
};
