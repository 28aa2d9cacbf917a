//! Storage TTL maintenance.
//!
//! Entries are bumped to the network maximum whenever they are touched and
//! fall below one day of remaining life.

use soroban_sdk::{Env, IntoVal, Val};

pub const DAY_IN_LEDGERS: u32 = 17_280;

pub fn extend_instance(env: &Env) {
    let max_ttl = env.storage().max_ttl();
    env.storage()
        .instance()
        .extend_ttl(max_ttl.saturating_sub(DAY_IN_LEDGERS), max_ttl);
}

/// Bump a persistent entry. The entry must exist.
pub fn extend_persistent<K>(env: &Env, key: &K)
where
    K: IntoVal<Env, Val>,
{
    let max_ttl = env.storage().max_ttl();
    env.storage()
        .persistent()
        .extend_ttl(key, max_ttl.saturating_sub(DAY_IN_LEDGERS), max_ttl);
}
