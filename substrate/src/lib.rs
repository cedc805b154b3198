// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Grid Substrate — Chain Client Library
//!
//! A blocking client for the grid's Substrate chain: it reads entities,
//! nodes, farms and contracts out of chain storage, and submits the calls
//! that create and update them.
//!
//! ## Architecture
//!
//! - **codec** — SCALE decoding with precise errors, tagged variants, and
//!   version-gated record decoding.
//! - **types** — Field-for-field definitions of every on-chain record.
//! - **chain** — The outside world as traits (connection, metadata,
//!   identity, pool), plus an in-memory chain.
//! - **storage** — Storage queries, record fetches and derived-index lookups.
//! - **transaction** — Call building, submission and outcome verification.
//! - **client** — The [`Substrate`] facade: one method per grid operation.
//! - **error** — [`SubstrateError`], the kinds callers match on.
//! - **config** — Pallet, storage item and call names; schema version tables.
//! - **logging** — Optional `tracing` subscriber setup.
//!
//! ## Ground Rules
//!
//! 1. Nothing is guessed. Unknown discriminants and schema versions are errors.
//! 2. Inclusion is not success. Every write is verified against block events.
//! 3. Zero is never an ID. A sentinel zero from an index is "not found".
//! 4. One borrowed connection per step, released on every exit path.
//!
//! ```rust,no_run
//! use grid_substrate::chain::memory::MemoryChain;
//! use grid_substrate::Substrate;
//!
//! let client = Substrate::new(MemoryChain::new());
//! match client.get_node(1) {
//!     Ok(node) => println!("node {} on farm {}", node.id, node.farm_id),
//!     Err(err) if err.is_not_found() => println!("no such node"),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```

pub mod chain;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod storage;
pub mod transaction;
pub mod types;

pub use client::Substrate;
pub use error::{Result, SubstrateError};
