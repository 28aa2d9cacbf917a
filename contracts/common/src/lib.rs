//! Shared reward accounting for the farm contract suite.
//!
//! This crate provides:
//! - [`fixed_point`]: the `SCALE`/`BOOST_BASE` constants, the 256-bit reward
//!   index and [`MathError`].
//! - [`accrual`]: the pool accumulator and per-account settlement used by every
//!   mutating farm call.
//! - [`projection`]: the pure pending-reward projection consumed off-chain.
//! - [`ttl`]: storage TTL maintenance shared by the contracts.
//!
//! The farm contract and the projector SDK both call into the same functions,
//! so a projection fed the on-chain inputs reproduces `earned` exactly.

#![cfg_attr(not(feature = "std"), no_std)]

// ── Modules ──────────────────────────────────────────────────────────────────

pub mod accrual;
pub mod fixed_point;
pub mod projection;
pub mod ttl;

pub use accrual::*;
pub use fixed_point::*;
pub use projection::*;
