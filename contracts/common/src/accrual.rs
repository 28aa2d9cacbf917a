//! Time-weighted, lock-boosted reward accumulator.
//!
//! Every mutating farm call runs the same two steps:
//!
//! 1. [`PoolState::accrue`] folds the time elapsed since `last_accrual_time`
//!    (clamped to `end_time`) into the shared index.
//! 2. [`StakePosition::settle`] credits the touched account with
//!    `amount · weight · Δindex / (SCALE² · BOOST_BASE)` and snapshots the index.
//!
//! Only after both steps may the caller change `amount` or `total_staked`.

use primitive_types::U256;
use soroban_sdk::contracttype;

use crate::fixed_point::{
    checked_add, checked_mul, owed_denominator, signed, unsigned, MathError, RewardIndex,
    BOOST_BASE, SCALE,
};

/// Pool-wide accounting state of one farm instance.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PoolState {
    pub total_staked: i128,
    /// Reward emitted per second across all stakers, scaled by `SCALE`.
    pub reward_rate: u128,
    pub reward_per_unit: RewardIndex,
    pub last_accrual_time: u64,
    pub end_time: u64,
}

/// One account's stake in a farm instance.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StakePosition {
    pub amount: i128,
    pub lock_end_time: u64,
    pub reward_per_unit_paid: RewardIndex,
    pub accrued: i128,
}

/// Accrual never runs past the end of the schedule.
pub fn effective_time(now: u64, end_time: u64) -> u64 {
    now.min(end_time)
}

/// Index growth for `elapsed` seconds: `floor(rate · elapsed · SCALE / total_staked)`.
///
/// Zero when nobody is staked; the caller still advances its clock so the
/// empty interval is never credited later.
pub fn index_delta(reward_rate: u128, elapsed: u64, total_staked: i128) -> Result<U256, MathError> {
    let total = unsigned(total_staked)?;
    if elapsed == 0 || total == 0 || reward_rate == 0 {
        return Ok(U256::zero());
    }
    let numerator = checked_mul(
        checked_mul(U256::from(reward_rate), U256::from(elapsed))?,
        U256::from(SCALE),
    )?;
    Ok(numerator / U256::from(total))
}

/// Weight of a position at `now`: the farm's boost while the lock is running,
/// `BOOST_BASE` from `lock_end_time` onwards (the boundary itself is unboosted).
///
/// The weight is applied to the whole unsettled interval when the position is
/// next settled. A position left untouched until its lock expires is valued
/// entirely at `BOOST_BASE`, so `earned` drops when `now` reaches
/// `lock_end_time`. Claiming before expiry banks the boosted share.
pub fn boost_weight(lock_end_time: u64, boost_multiplier: u32, now: u64) -> u32 {
    if now < lock_end_time {
        boost_multiplier
    } else {
        BOOST_BASE
    }
}

/// Reward owed for `amount` at `weight` over an index growth of `index_delta`.
///
/// Split as `Δ = q·D + r` so the product never needs more than 256 bits:
/// `floor(Δ·w/D) = q·w + floor(r·w/D)` for `w = amount · weight`.
pub fn owed(amount: i128, weight: u32, index_delta: U256) -> Result<i128, MathError> {
    let amount = unsigned(amount)?;
    if amount == 0 || index_delta.is_zero() {
        return Ok(0);
    }
    let weighted = checked_mul(U256::from(amount), U256::from(weight))?;
    let denominator = owed_denominator();
    let (whole, remainder) = index_delta.div_mod(denominator);
    let total = checked_add(
        checked_mul(whole, weighted)?,
        checked_mul(remainder, weighted)? / denominator,
    )?;
    signed(total)
}

impl PoolState {
    /// The index as it would stand at `now`, without writing anything.
    pub fn index_at(&self, now: u64) -> Result<U256, MathError> {
        let effective_now = effective_time(now, self.end_time);
        let elapsed = effective_now.saturating_sub(self.last_accrual_time);
        let delta = index_delta(self.reward_rate, elapsed, self.total_staked)?;
        checked_add(self.reward_per_unit.to_u256(), delta)
    }

    /// Fold elapsed time into the index and advance `last_accrual_time`.
    ///
    /// `last_accrual_time` only moves forward and never passes `end_time`.
    pub fn accrue(&mut self, now: u64) -> Result<U256, MathError> {
        let index = self.index_at(now)?;
        self.reward_per_unit = RewardIndex::from_u256(index);
        let effective_now = effective_time(now, self.end_time);
        if effective_now > self.last_accrual_time {
            self.last_accrual_time = effective_now;
        }
        Ok(index)
    }

    pub fn add_stake(&mut self, amount: i128) -> Result<(), MathError> {
        self.total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;
        Ok(())
    }

    pub fn remove_stake(&mut self, amount: i128) -> Result<(), MathError> {
        let remaining = self
            .total_staked
            .checked_sub(amount)
            .ok_or(MathError::Overflow)?;
        unsigned(remaining)?;
        self.total_staked = remaining;
        Ok(())
    }
}

impl StakePosition {
    /// Everything the position could claim if the index stood at `index`.
    pub fn pending(&self, index: U256, weight: u32) -> Result<i128, MathError> {
        let delta = index
            .checked_sub(self.reward_per_unit_paid.to_u256())
            .ok_or(MathError::Overflow)?;
        let fresh = owed(self.amount, weight, delta)?;
        self.accrued.checked_add(fresh).ok_or(MathError::Overflow)
    }

    /// Move everything owed up to `index` into `accrued` and snapshot the index.
    pub fn settle(&mut self, index: U256, weight: u32) -> Result<(), MathError> {
        self.accrued = self.pending(index, weight)?;
        self.reward_per_unit_paid = RewardIndex::from_u256(index);
        Ok(())
    }

    pub fn is_locked(&self, now: u64) -> bool {
        now < self.lock_end_time
    }
}
