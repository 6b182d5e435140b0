//! Signed, time-bounded session credentials.
//!
//! A verified identity plus its provider token become one HS256-signed
//! credential with a fixed TTL. Verification fails closed: malformed, badly
//! signed, and expired credentials are all rejected outright — a rejected
//! credential carries exactly as much trust as no credential.
//!
//! The signing secret is constructor state, built once from config at
//! startup. Runtime key rotation is a future extension; it would slot in
//! here as a key set without changing the issue/verify contract.

mod issuer;

pub use issuer::{DEFAULT_TTL_DAYS, Session, SessionError, SessionIssuer};
