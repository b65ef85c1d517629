use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::keccak;

use crate::constants::*;
use crate::state::{ActivityKind, Rarity, WorkoutData};

/// Deterministic digest over the defining fields of a workout. Two records
/// that agree on all six fields collide on purpose: that is the dedup key.
pub fn workout_fingerprint(owner: &Pubkey, workout: &WorkoutData) -> [u8; 32] {
    keccak::hashv(&[
        owner.as_ref(),
        &workout.distance_meters.to_le_bytes(),
        &workout.duration_seconds.to_le_bytes(),
        &workout.calories.to_le_bytes(),
        &[workout.kind.discriminant()],
        &workout.timestamp.to_le_bytes(),
    ])
    .to_bytes()
}

/// Day bucket used for streaks and the daily emission counter.
pub fn day_index(timestamp: i64) -> u64 {
    (timestamp / SECONDS_PER_DAY).max(0) as u64
}

/// Base reward in microtokens: whole kilometres times the per-kind rate.
/// Partial kilometres truncate, as the rest of the percentage math does.
pub fn base_reward(kind: ActivityKind, distance_meters: u64) -> u64 {
    (distance_meters / 1_000).saturating_mul(kind.rate_per_km())
}

/// Integer-percent streak multiplier, largest qualifying tier.
pub fn streak_multiplier_percent(streak: u32) -> u64 {
    for &(min_streak, percent) in STREAK_MULTIPLIERS.iter() {
        if streak >= min_streak {
            return percent;
        }
    }
    100
}

/// Flat distance milestone bonus; only the single largest threshold pays.
pub fn milestone_bonus(distance_meters: u64) -> u64 {
    let distance_km = distance_meters / 1_000;
    for &(threshold_km, bonus) in MILESTONE_BONUSES.iter() {
        if distance_km >= threshold_km {
            return bonus;
        }
    }
    0
}

/// Leveling law: one level per LEVEL_EXPERIENCE_STEP experience, floor
/// semantics, starting at level 1.
pub fn level_for_experience(experience: u64) -> u16 {
    ((experience / LEVEL_EXPERIENCE_STEP) + 1).min(u16::MAX as u64) as u16
}

/// Rarity-biased boost stat derived from a seed and a per-stat label.
/// Identical seed inputs reproduce identical stats, which the tests rely
/// on. The seed is built from clock data the block producer can observe,
/// so stats are predictable to a colluding leader; a verifiable randomness
/// feed should replace the seed source in an adversarial deployment.
pub fn derive_boost(seed: &[u8], label: &[u8], rarity: Rarity) -> u16 {
    let (base, variance) = rarity.boost_range();
    let digest = keccak::hashv(&[seed, label]).to_bytes();
    let mut roll_bytes = [0u8; 8];
    roll_bytes.copy_from_slice(&digest[..8]);
    let roll = u64::from_le_bytes(roll_bytes);
    base + (roll % variance as u64) as u16
}
