//! Fixed-point helpers shared by the on-chain accounting and the projector.
//!
//! Amounts are `i128` (Stellar token convention), the emission rate is a
//! `u128` carrying one factor of [`SCALE`], and the reward index is a 256-bit
//! value carrying `SCALE²`. Every operation is checked: callers get a
//! [`MathError`] instead of a wrapped or saturated value.

use primitive_types::U256;
use soroban_sdk::contracttype;

/// Fixed-point scale applied to the reward rate and (twice) to the index.
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Boost weight meaning 1.00×.
pub const BOOST_BASE: u32 = 100;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MathError {
    /// An intermediate or final value does not fit its target width.
    Overflow,
    /// A token amount that must be non-negative was negative.
    NegativeAmount,
    /// A schedule with zero length was supplied.
    ZeroDuration,
}

/// Cumulative reward per staked unit, scaled by `SCALE²`.
///
/// Stored as two `u128` words because Soroban has no native 256-bit
/// contract value that is usable without an `Env`.
#[contracttype]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RewardIndex {
    pub hi: u128,
    pub lo: u128,
}

impl RewardIndex {
    pub const ZERO: RewardIndex = RewardIndex { hi: 0, lo: 0 };

    pub fn from_u256(value: U256) -> Self {
        let U256(words) = value;
        RewardIndex {
            hi: (u128::from(words[3]) << 64) | u128::from(words[2]),
            lo: (u128::from(words[1]) << 64) | u128::from(words[0]),
        }
    }

    pub fn to_u256(self) -> U256 {
        U256([
            self.lo as u64,
            (self.lo >> 64) as u64,
            self.hi as u64,
            (self.hi >> 64) as u64,
        ])
    }
}

/// `SCALE² · BOOST_BASE`, the denominator that turns `amount · weight · Δindex`
/// back into token units.
pub fn owed_denominator() -> U256 {
    U256::from(SCALE) * U256::from(SCALE) * U256::from(BOOST_BASE)
}

pub(crate) fn unsigned(amount: i128) -> Result<u128, MathError> {
    u128::try_from(amount).map_err(|_| MathError::NegativeAmount)
}

pub(crate) fn signed(value: U256) -> Result<i128, MathError> {
    if value.bits() > 127 {
        return Err(MathError::Overflow);
    }
    i128::try_from(value.low_u128()).map_err(|_| MathError::Overflow)
}

pub(crate) fn checked_mul(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_mul(b).ok_or(MathError::Overflow)
}

pub(crate) fn checked_add(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

/// Emission rate for a funded schedule: `floor(total_reward · SCALE / duration)`.
pub fn reward_rate(total_reward: i128, duration: u64) -> Result<u128, MathError> {
    if duration == 0 {
        return Err(MathError::ZeroDuration);
    }
    let scaled = checked_mul(U256::from(unsigned(total_reward)?), U256::from(SCALE))?;
    let rate = scaled / U256::from(duration);
    if rate.bits() > 128 {
        return Err(MathError::Overflow);
    }
    Ok(rate.low_u128())
}
