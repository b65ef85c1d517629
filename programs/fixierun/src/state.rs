use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::FixierunError;

#[account]
pub struct GlobalState {
    /* ── governance ─────────────────────────────── */
    pub authority: Pubkey,    // Governance authority
    pub token_mint: Pubkey,   // FIXIE token mint
    pub rewards_vault: Pubkey, // Preminted supply held for claims

    /* ── emission mechanics ─────────────────────── */
    pub max_supply: u64,         // Hard cap (mint-burn accounting)
    pub daily_emission_cap: u64, // Per-day issuance ceiling
    pub total_issued: u64,       // Cumulative reward credits
    pub burned_tokens: u64,      // Destroyed via collectible purchases
    pub day_index: u64,          // Day bucket of `day_issued`
    pub day_issued: u64,         // Issued within `day_index`

    /* ── workout validation ─────────────────────── */
    pub freshness_window_seconds: i64, // Max age of an accepted workout
    pub production_enabled: bool,      // Global kill-switch

    /* ── authorization rosters ──────────────────── */
    pub minters: Vec<Pubkey>,    // Principals allowed to credit directly
    pub validators: Vec<Pubkey>, // Principals allowed to submit workouts

    /* ── counters ───────────────────────────────── */
    pub total_collectibles: u64, // Also the collectible id allocator
    pub total_workouts: u64,     // Accepted workout submissions
}

impl GlobalState {
    pub fn is_minter(&self, key: &Pubkey) -> bool {
        self.minters.contains(key)
    }

    pub fn is_validator(&self, key: &Pubkey) -> bool {
        self.validators.contains(key)
    }

    pub fn add_to_roster(roster: &mut Vec<Pubkey>, key: Pubkey) -> Result<()> {
        require!(roster.len() < MAX_ROSTER_SIZE, FixierunError::RosterFull);
        require!(!roster.contains(&key), FixierunError::AlreadyRegistered);
        roster.push(key);
        Ok(())
    }

    pub fn remove_from_roster(roster: &mut Vec<Pubkey>, key: &Pubkey) -> Result<()> {
        let position = roster
            .iter()
            .position(|member| member == key)
            .ok_or(FixierunError::NotRegistered)?;
        roster.swap_remove(position);
        Ok(())
    }

    /// Single choke point for reward issuance. Enforces the supply cap and
    /// the per-day emission cap, rolling the day counter when `day` has
    /// advanced. Leaves all counters untouched on failure.
    pub fn checked_issue(&mut self, amount: u64, day: u64) -> Result<()> {
        let day_issued = if day > self.day_index {
            0
        } else {
            self.day_issued
        };

        let live_supply = self.total_issued.saturating_sub(self.burned_tokens);
        require!(
            live_supply.saturating_add(amount) <= self.max_supply,
            FixierunError::SupplyExceeded
        );
        require!(
            day_issued.saturating_add(amount) <= self.daily_emission_cap,
            FixierunError::DailyEmissionExceeded
        );

        if day > self.day_index {
            self.day_index = day;
        }
        self.day_issued = day_issued.saturating_add(amount);
        self.total_issued = self.total_issued.saturating_add(amount);
        Ok(())
    }
}

#[account]
pub struct Player {
    pub owner: Pubkey,
    pub balance: u64, // Earned, unclaimed microtokens
    /* ── streak tracking ────────────────────────── */
    pub streak: u32,            // Consecutive active days
    pub last_activity_day: u64, // Day bucket of the latest accepted workout
    /* ── lifetime stats ─────────────────────────── */
    pub total_rewards: u64,
    pub total_workouts: u64,
    pub total_distance_meters: u64,
    /* ── equipment ──────────────────────────────── */
    pub collectibles: Vec<Collectible>,
}

impl Player {
    pub fn collectible(&self, id: u64) -> Option<&Collectible> {
        self.collectibles.iter().find(|c| c.id == id)
    }

    pub fn collectible_mut(&mut self, id: u64) -> Option<&mut Collectible> {
        self.collectibles.iter_mut().find(|c| c.id == id)
    }

    pub fn debit(&mut self, amount: u64) -> Result<()> {
        require!(self.balance >= amount, FixierunError::InsufficientBalance);
        self.balance -= amount;
        Ok(())
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct Collectible {
    pub id: u64, // Globally unique, allocated from GlobalState
    pub rarity: Rarity,
    pub item_class: ItemClass,
    pub level: u16,
    pub experience: u64,
    pub speed_boost: u16,      // Percent
    pub reward_boost: u16,     // Percent, applied to workout rewards
    pub experience_boost: u16, // Percent
    pub staked: bool,
    pub staked_at: i64, // Unix timestamp, 0 when unstaked
}

impl Collectible {
    pub const SIZE: usize = 8 + 1 + 1 + 2 + 8 + 2 + 2 + 2 + 1 + 8;

    /// Adds experience and applies level-ups. A level is gained every
    /// LEVEL_EXPERIENCE_STEP points; each level adds a fixed increment to
    /// every boost. Returns the new level when one or more were gained.
    pub fn grant_experience(&mut self, amount: u64) -> Option<u16> {
        self.experience = self.experience.saturating_add(amount);
        let new_level = crate::helpers::level_for_experience(self.experience);
        if new_level <= self.level {
            return None;
        }
        let gained = (new_level - self.level).saturating_mul(BOOST_INCREMENT_PER_LEVEL);
        self.level = new_level;
        self.speed_boost = self.speed_boost.saturating_add(gained);
        self.reward_boost = self.reward_boost.saturating_add(gained);
        self.experience_boost = self.experience_boost.saturating_add(gained);
        Some(new_level)
    }
}

/// Dedup marker: one PDA per workout fingerprint, never closed.
#[account]
pub struct WorkoutReceipt {
    pub fingerprint: [u8; 32],
    pub owner: Pubkey,
    pub day: u64,
    pub tokens_earned: u64,
    pub processed: bool,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Purchase cost in microtokens, burned on mint.
    pub fn mint_cost(self) -> u64 {
        let tokens: u64 = match self {
            Rarity::Common => 10,
            Rarity::Uncommon => 25,
            Rarity::Rare => 50,
            Rarity::Epic => 100,
            Rarity::Legendary => 250,
        };
        tokens * MICROTOKENS_PER_TOKEN
    }

    /// (base, variance) for hash-derived boost stats:
    /// boost = base + roll % variance.
    pub fn boost_range(self) -> (u16, u16) {
        match self {
            Rarity::Common => (1, 2),
            Rarity::Uncommon => (3, 3),
            Rarity::Rare => (6, 4),
            Rarity::Epic => (10, 5),
            Rarity::Legendary => (15, 5),
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemClass {
    Sneaker,
    Bike,
    Achievement,
    Special,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityKind {
    Running,
    Cycling,
    Walking,
}

impl ActivityKind {
    pub fn rate_per_km(self) -> u64 {
        match self {
            ActivityKind::Running => RUNNING_RATE_PER_KM,
            ActivityKind::Cycling => CYCLING_RATE_PER_KM,
            ActivityKind::Walking => WALKING_RATE_PER_KM,
        }
    }

    /// Stable tag used in the workout fingerprint.
    pub fn discriminant(self) -> u8 {
        match self {
            ActivityKind::Running => 0,
            ActivityKind::Cycling => 1,
            ActivityKind::Walking => 2,
        }
    }
}

/// One activity record, delivered by an authorized validator. The athlete's
/// wallet rides alongside as an account, not a field.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct WorkoutData {
    pub distance_meters: u64,
    pub duration_seconds: u64,
    pub calories: u64,
    pub kind: ActivityKind,
    pub timestamp: i64,
    pub equipped_collectibles: Vec<u64>,
}
