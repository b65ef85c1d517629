pub const GLOBAL_STATE_SEED: &[u8] = b"global_state";
pub const PLAYER_SEED: &[u8] = b"player";
pub const REWARDS_VAULT_SEED: &[u8] = b"rewards_vault";
pub const WORKOUT_SEED: &[u8] = b"workout";

// Fixed-point scale: all reward amounts are u64 microtokens (6 decimals).
pub const MICROTOKENS_PER_TOKEN: u64 = 1_000_000;

// Emission defaults (overridable at initialize_program)
pub const DEFAULT_MAX_SUPPLY: u64 = 1_000_000_000 * MICROTOKENS_PER_TOKEN; // 1B FIXIE
pub const DEFAULT_DAILY_EMISSION_CAP: u64 = 500_000 * MICROTOKENS_PER_TOKEN; // 500K FIXIE per day

// Workout validation
pub const DEFAULT_FRESHNESS_WINDOW_SECONDS: i64 = 3_600; // 1 hour max workout age
pub const SECONDS_PER_DAY: i64 = 86_400;

// Collectible progression
pub const LEVEL_EXPERIENCE_STEP: u64 = 1_000; // level = experience / step + 1
pub const BOOST_INCREMENT_PER_LEVEL: u16 = 1; // each boost gains 1% per level
pub const EXPERIENCE_DIVISOR_METERS: u64 = 100; // 1 xp per 100m of workout distance

// Account limits
pub const MAX_COLLECTIBLES_PER_PLAYER: usize = 32;
pub const MAX_ROSTER_SIZE: usize = 16; // minter and validator rosters each

// === Reward rates (microtokens per whole km) ==============================
// running 1.2 / cycling 0.8 / walking 0.5 FIXIE per km
pub const RUNNING_RATE_PER_KM: u64 = 1_200_000;
pub const CYCLING_RATE_PER_KM: u64 = 800_000;
pub const WALKING_RATE_PER_KM: u64 = 500_000;

// === Distance milestone bonuses (km threshold, microtokens) ===============
// checked largest-first; only the single largest match pays out
pub const MILESTONE_BONUSES: [(u64, u64); 5] = [
    (42, 50 * MICROTOKENS_PER_TOKEN), // marathon
    (21, 25 * MICROTOKENS_PER_TOKEN), // half marathon
    (10, 10 * MICROTOKENS_PER_TOKEN),
    (5, 5 * MICROTOKENS_PER_TOKEN),
    (1, MICROTOKENS_PER_TOKEN),
];

// === Streak multipliers (min streak days, percent) ========================
pub const STREAK_MULTIPLIERS: [(u32, u64); 4] = [
    (30, 150),
    (14, 130),
    (7, 115),
    (3, 105),
];
pub const STREAK_BONUS_INTERVAL: u32 = 7; // weekly flat bonus cadence
