#![no_std]

pub mod events;

use common::{boost_weight, reward_rate, ttl, MathError, PoolState, RewardIndex, StakePosition};
use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short, token,
    xdr::{FromXdr, ToXdr},
    Address, Bytes, Env, Symbol,
};

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const CONFIG: Symbol = symbol_short!("CONFIG");
const POOL: Symbol = symbol_short!("POOL");
const FUNDED: Symbol = symbol_short!("FUNDED");
const TOTAL_REWARD: Symbol = symbol_short!("TOT_RWD");

// Per-account persistent storage uses tuple keys:  (prefix, account)
const POSITION: Symbol = symbol_short!("POS");

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum FarmError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidArgument = 4,
    AlreadyFunded = 5,
    InsufficientStake = 6,
    StakeLocked = 7,
    TransferFailed = 8,
    ArithmeticOverflow = 9,
}

impl From<MathError> for FarmError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::Overflow => FarmError::ArithmeticOverflow,
            MathError::NegativeAmount | MathError::ZeroDuration => FarmError::InvalidArgument,
        }
    }
}

// ── Public-facing types ──────────────────────────────────────────────────────

/// Parameters carried by the `init_bytes` forwarded from the registry.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FarmInitParams {
    pub owner: Address,
    pub stake_token: Address,
    pub reward_token: Address,
    /// Length of the reward schedule in seconds.
    pub duration: u64,
    /// Seconds a stake stays locked after each `stake` call.
    pub lock_duration: u64,
    /// Weight of a locked position; 100 means 1.00×.
    pub boost_multiplier: u32,
}

impl FarmInitParams {
    /// XDR encoding accepted by `initialize`.
    pub fn encode(&self, env: &Env) -> Bytes {
        self.clone().to_xdr(env)
    }

    pub fn decode(env: &Env, bytes: &Bytes) -> Result<Self, FarmError> {
        FarmInitParams::from_xdr(env, bytes).map_err(|_| FarmError::InvalidArgument)
    }
}

/// Immutable configuration written once by `initialize`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FarmConfig {
    pub owner: Address,
    pub stake_token: Address,
    pub reward_token: Address,
    pub start_time: u64,
    pub duration: u64,
    pub end_time: u64,
    pub lock_duration: u64,
    pub boost_multiplier: u32,
}

/// Public accounting tuple, also served XDR-encoded by `get_metadata`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FarmSnapshot {
    pub stake_token: Address,
    pub reward_token: Address,
    pub total_staked: i128,
    pub reward_rate: u128,
    pub last_accrual_time: u64,
    pub is_funded: bool,
    pub total_reward: i128,
    pub end_time: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum FarmStatus {
    Uninitialized = 0,
    Initialized = 1,
    Funded = 2,
    Ended = 3,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct FarmContract;

#[contractimpl]
impl FarmContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// One-shot setup from XDR-encoded [`FarmInitParams`].
    ///
    /// The schedule starts at the current ledger timestamp and ends
    /// `duration` seconds later. Fails with `InvalidArgument` on malformed
    /// bytes, a zero duration, a boost below 1.00× or identical tokens.
    pub fn initialize(env: Env, init_bytes: Bytes) -> Result<(), FarmError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(FarmError::AlreadyInitialized);
        }

        let params = FarmInitParams::decode(&env, &init_bytes)?;
        if params.duration == 0
            || params.boost_multiplier < common::BOOST_BASE
            || params.stake_token == params.reward_token
        {
            return Err(FarmError::InvalidArgument);
        }

        let now = env.ledger().timestamp();
        let end_time = now
            .checked_add(params.duration)
            .ok_or(FarmError::ArithmeticOverflow)?;

        let config = FarmConfig {
            owner: params.owner,
            stake_token: params.stake_token,
            reward_token: params.reward_token,
            start_time: now,
            duration: params.duration,
            end_time,
            lock_duration: params.lock_duration,
            boost_multiplier: params.boost_multiplier,
        };
        let pool = PoolState {
            total_staked: 0,
            reward_rate: 0,
            reward_per_unit: RewardIndex::ZERO,
            last_accrual_time: now,
            end_time,
        };

        env.storage().instance().set(&CONFIG, &config);
        env.storage().instance().set(&POOL, &pool);
        env.storage().instance().set(&FUNDED, &false);
        env.storage().instance().set(&TOTAL_REWARD, &0i128);
        env.storage().instance().set(&INITIALIZED, &true);
        ttl::extend_instance(&env);

        events::publish_initialized(&env, &config);

        Ok(())
    }

    // ── Funding ─────────────────────────────────────────────────────────────

    /// Pull `amount` reward tokens from the owner and start emission.
    ///
    /// Funding happens once. The accumulator is flushed first so the unfunded
    /// stretch of the schedule is never paid out at the new rate.
    pub fn fund(env: Env, funder: Address, amount: i128) -> Result<(), FarmError> {
        let config = Self::load_config(&env)?;
        funder.require_auth();

        if funder != config.owner {
            return Err(FarmError::Unauthorized);
        }
        if amount <= 0 {
            return Err(FarmError::InvalidArgument);
        }
        if Self::is_funded(&env) {
            return Err(FarmError::AlreadyFunded);
        }

        let now = env.ledger().timestamp();
        let mut pool = Self::load_pool(&env)?;
        pool.accrue(now)?;
        pool.reward_rate = reward_rate(amount, config.duration)?;

        Self::move_tokens(
            &env,
            &config.reward_token,
            &funder,
            &env.current_contract_address(),
            amount,
        )?;

        env.storage().instance().set(&POOL, &pool);
        env.storage().instance().set(&FUNDED, &true);
        env.storage().instance().set(&TOTAL_REWARD, &amount);
        ttl::extend_instance(&env);

        events::publish_funded(&env, funder, amount, pool.reward_rate);

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` stake tokens.
    ///
    /// Rewards are settled at the old balance before the deposit lands, and
    /// every deposit restarts the lock at `now + lock_duration`.
    pub fn stake(env: Env, staker: Address, amount: i128) -> Result<(), FarmError> {
        let config = Self::load_config(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(FarmError::InvalidArgument);
        }

        let now = env.ledger().timestamp();
        let mut pool = Self::load_pool(&env)?;
        let mut position = Self::load_position(&env, &staker);
        Self::settle(&config, &mut pool, &mut position, now)?;

        Self::move_tokens(
            &env,
            &config.stake_token,
            &staker,
            &env.current_contract_address(),
            amount,
        )?;

        position.amount = position
            .amount
            .checked_add(amount)
            .ok_or(FarmError::ArithmeticOverflow)?;
        position.lock_end_time = now
            .checked_add(config.lock_duration)
            .ok_or(FarmError::ArithmeticOverflow)?;
        pool.add_stake(amount)?;

        Self::save(&env, &staker, &pool, &position);

        events::publish_staked(
            &env,
            staker,
            amount,
            position.lock_end_time,
            pool.total_staked,
        );

        Ok(())
    }

    /// Withdraw `amount` stake tokens once the position's lock has expired.
    pub fn unstake(env: Env, staker: Address, amount: i128) -> Result<(), FarmError> {
        let config = Self::load_config(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(FarmError::InvalidArgument);
        }

        let now = env.ledger().timestamp();
        let mut position = Self::load_position(&env, &staker);
        if position.is_locked(now) {
            return Err(FarmError::StakeLocked);
        }
        if amount > position.amount {
            return Err(FarmError::InsufficientStake);
        }

        let mut pool = Self::load_pool(&env)?;
        Self::settle(&config, &mut pool, &mut position, now)?;

        position.amount -= amount;
        pool.remove_stake(amount)?;

        // Effects are written before the outgoing transfer.
        Self::save(&env, &staker, &pool, &position);

        Self::move_tokens(
            &env,
            &config.stake_token,
            &env.current_contract_address(),
            &staker,
            amount,
        )?;

        events::publish_unstaked(&env, staker, amount, pool.total_staked);

        Ok(())
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Pay out everything `staker` has accrued and return the amount.
    ///
    /// Returns 0 without reverting when nothing is owed.
    pub fn claim(env: Env, staker: Address) -> Result<i128, FarmError> {
        let config = Self::load_config(&env)?;
        staker.require_auth();

        let now = env.ledger().timestamp();
        let mut pool = Self::load_pool(&env)?;
        let mut position = Self::load_position(&env, &staker);
        Self::settle(&config, &mut pool, &mut position, now)?;

        let owed = position.accrued;
        position.accrued = 0;
        Self::save(&env, &staker, &pool, &position);

        if owed == 0 {
            return Ok(0);
        }

        Self::move_tokens(
            &env,
            &config.reward_token,
            &env.current_contract_address(),
            &staker,
            owed,
        )?;

        events::publish_reward_claimed(&env, staker, owed);

        Ok(owed)
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Reward `account` could claim right now.
    ///
    /// Uses the weight at `now`, like `claim` would, so an unclaimed boost
    /// disappears once the lock has expired; see [`boost_weight`].
    pub fn earned(env: Env, account: Address) -> Result<i128, FarmError> {
        let config = Self::load_config(&env)?;
        let pool = Self::load_pool(&env)?;
        let position = Self::load_position(&env, &account);

        let now = env.ledger().timestamp();
        let weight = boost_weight(position.lock_end_time, config.boost_multiplier, now);
        Ok(position.pending(pool.index_at(now)?, weight)?)
    }

    /// Staked amount and lock expiry of `account`.
    pub fn get_user_stake(env: Env, account: Address) -> (i128, u64) {
        let position = Self::load_position(&env, &account);
        (position.amount, position.lock_end_time)
    }

    pub fn get_position(env: Env, account: Address) -> StakePosition {
        Self::load_position(&env, &account)
    }

    pub fn get_snapshot(env: Env) -> Result<FarmSnapshot, FarmError> {
        let config = Self::load_config(&env)?;
        let pool = Self::load_pool(&env)?;
        Ok(FarmSnapshot {
            stake_token: config.stake_token,
            reward_token: config.reward_token,
            total_staked: pool.total_staked,
            reward_rate: pool.reward_rate,
            last_accrual_time: pool.last_accrual_time,
            is_funded: Self::is_funded(&env),
            total_reward: env.storage().instance().get(&TOTAL_REWARD).unwrap_or(0),
            end_time: config.end_time,
        })
    }

    /// XDR of `(stake_token, reward_token, total_staked, reward_rate,
    /// last_accrual_time, is_funded, total_reward, end_time)`.
    ///
    /// Indexers decode this positionally; the order and arity are fixed.
    pub fn get_metadata(env: Env) -> Result<Bytes, FarmError> {
        let s = Self::get_snapshot(env.clone())?;
        Ok((
            s.stake_token,
            s.reward_token,
            s.total_staked,
            s.reward_rate,
            s.last_accrual_time,
            s.is_funded,
            s.total_reward,
            s.end_time,
        )
            .to_xdr(&env))
    }

    pub fn get_config(env: Env) -> Result<FarmConfig, FarmError> {
        Self::load_config(&env)
    }

    pub fn get_owner(env: Env) -> Result<Address, FarmError> {
        Ok(Self::load_config(&env)?.owner)
    }

    pub fn status(env: Env) -> FarmStatus {
        let Ok(config) = Self::load_config(&env) else {
            return FarmStatus::Uninitialized;
        };
        if env.ledger().timestamp() >= config.end_time {
            FarmStatus::Ended
        } else if Self::is_funded(&env) {
            FarmStatus::Funded
        } else {
            FarmStatus::Initialized
        }
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn load_config(env: &Env) -> Result<FarmConfig, FarmError> {
        env.storage()
            .instance()
            .get(&CONFIG)
            .ok_or(FarmError::NotInitialized)
    }

    fn load_pool(env: &Env) -> Result<PoolState, FarmError> {
        env.storage()
            .instance()
            .get(&POOL)
            .ok_or(FarmError::NotInitialized)
    }

    fn is_funded(env: &Env) -> bool {
        env.storage().instance().get(&FUNDED).unwrap_or(false)
    }

    fn load_position(env: &Env, account: &Address) -> StakePosition {
        env.storage()
            .persistent()
            .get(&(POSITION, account.clone()))
            .unwrap_or_default()
    }

    /// Accrue the pool to `now`, then credit `position` at its weight at `now`.
    /// Past `lock_end_time` that is `BOOST_BASE` for the whole unsettled span.
    fn settle(
        config: &FarmConfig,
        pool: &mut PoolState,
        position: &mut StakePosition,
        now: u64,
    ) -> Result<(), FarmError> {
        let index = pool.accrue(now)?;
        let weight = boost_weight(position.lock_end_time, config.boost_multiplier, now);
        position.settle(index, weight)?;
        Ok(())
    }

    fn save(env: &Env, account: &Address, pool: &PoolState, position: &StakePosition) {
        let key = (POSITION, account.clone());
        env.storage().persistent().set(&key, position);
        ttl::extend_persistent(env, &key);
        env.storage().instance().set(&POOL, pool);
        ttl::extend_instance(env);
    }

    /// Move tokens through the asset contract. Any rejection by the token
    /// becomes `TransferFailed`.
    fn move_tokens(
        env: &Env,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<(), FarmError> {
        match token::Client::new(env, token).try_transfer(from, to, &amount) {
            Ok(Ok(())) => Ok(()),
            _ => Err(FarmError::TransferFailed),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
