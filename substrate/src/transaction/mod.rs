//! # Transaction Module
//!
//! Building, signing, submitting and verifying state-changing calls.
//!
//! ## Architecture
//!
//! ```text
//! builder.rs — CallBuilder: positional SCALE args resolved against metadata
//! submit.rs  — SignedExtrinsic, submit-and-watch, event inspection, verdict
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build**: [`CallBuilder`] resolves `Module.function` to its index.
//! 2. **Sign**: [`SignedExtrinsic::sign`] with the caller's [`Identity`](crate::chain::Identity).
//! 3. **Submit**: blocks until the extrinsic is in a block.
//! 4. **Verify**: [`inspect_events`] finds the signer's verdict and
//!    [`verify_outcome`] maps it to `Ok(block)` or a typed error.
//!
//! The verified result is a block hash only. Generated identifiers are read
//! back from storage by the caller.

pub mod builder;
pub mod submit;

pub use builder::{BuildError, Call, CallBuilder};
pub use submit::{
    execute, inspect_events, submit, verify_outcome, Inclusion, Outcome, SignedExtrinsic,
};
