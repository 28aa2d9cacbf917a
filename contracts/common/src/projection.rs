//! Pure pending-reward projection for clients that tick between refreshes.
//!
//! The projection applies the pool's last-known rate to the caller's own
//! stake. It is exact while nobody else stakes or unstakes; clients must
//! replace their inputs with the authoritative values after every confirmed
//! read or transaction.

use crate::accrual::{boost_weight, effective_time, index_delta, owed};
use crate::fixed_point::{unsigned, MathError};

/// Everything the projection needs, as last read from the farm.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProjectionInput {
    pub staked_amount: i128,
    pub total_staked: i128,
    /// Pool emission rate, scaled by `SCALE`.
    pub reward_rate: u128,
    /// `last_accrual_time` of the snapshot the other fields came from.
    pub last_update_time: u64,
    pub end_time: u64,
    /// `earned(account)` at `last_update_time`.
    pub already_accrued: i128,
    pub lock_end_time: u64,
    pub boost_multiplier: u32,
}

/// Projected claimable reward at wall-clock `now`.
///
/// Time is clamped to `end_time` and never runs backwards past
/// `last_update_time`, so the result is at least `already_accrued`.
pub fn project_pending(input: &ProjectionInput, now: u64) -> Result<i128, MathError> {
    unsigned(input.already_accrued)?;
    let effective_now = effective_time(now, input.end_time);
    let elapsed = effective_now.saturating_sub(input.last_update_time);
    let delta = index_delta(input.reward_rate, elapsed, input.total_staked)?;
    let weight = boost_weight(input.lock_end_time, input.boost_multiplier, now);
    let fresh = owed(input.staked_amount, weight, delta)?;
    input
        .already_accrued
        .checked_add(fresh)
        .ok_or(MathError::Overflow)
}
