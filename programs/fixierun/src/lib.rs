use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod helpers;
pub mod instructions;
pub mod state;

use errors::FixierunError;
use instructions::*;
use state::{ItemClass, Rarity, WorkoutData};
use std::str::FromStr;

const ADMIN: &str = "8hd5Q6fUSvxzcpGcx6K1ALzsDKDH8bKpkAqmv6BZpbix";

declare_id!("HesobWZGbGWq22NDw2JJWrCGRParLdb19WnQ3TNuPQAh");

#[program]
pub mod fixierun {
    use super::*;

    #[access_control(enforce_admin(ctx.accounts.authority.key))]
    pub fn initialize_program(
        ctx: Context<InitializeProgram>,
        max_supply: u64,
        daily_emission_cap: u64,
        freshness_window_seconds: Option<i64>,
    ) -> Result<()> {
        instructions::initialize_program(ctx, max_supply, daily_emission_cap, freshness_window_seconds)
    }
    /// ────────────────────────────────────────────────────────────────────────────
    ///  ALL ADMIN FUNCTIONS ENFORCED BY AUTHORITY SIGNING IXS
    /// ────────────────────────────────────────────────────────────────────────────
    pub fn toggle_production(ctx: Context<AdminAction>, enable: bool) -> Result<()> {
        instructions::toggle_production(ctx, enable)
    }

    pub fn update_parameters(
        ctx: Context<AdminAction>,
        freshness_window_seconds: Option<i64>,
    ) -> Result<()> {
        instructions::update_parameters(ctx, freshness_window_seconds)
    }

    pub fn add_minter(ctx: Context<AdminAction>, minter: Pubkey) -> Result<()> {
        instructions::add_minter(ctx, minter)
    }

    pub fn remove_minter(ctx: Context<AdminAction>, minter: Pubkey) -> Result<()> {
        instructions::remove_minter(ctx, minter)
    }

    pub fn add_validator(ctx: Context<AdminAction>, validator: Pubkey) -> Result<()> {
        instructions::add_validator(ctx, validator)
    }

    pub fn remove_validator(ctx: Context<AdminAction>, validator: Pubkey) -> Result<()> {
        instructions::remove_validator(ctx, validator)
    }

    pub fn grant_experience(
        ctx: Context<GrantExperience>,
        collectible_id: u64,
        amount: u64,
    ) -> Result<()> {
        instructions::grant_experience(ctx, collectible_id, amount)
    }

    // ────────────────────────────────────────────────────────────────────────────
    ///  ROSTER-GATED FUNCTIONS (validators / minters)
    // ────────────────────────────────────────────────────────────────────────────
    pub fn submit_workout(
        ctx: Context<SubmitWorkout>,
        fingerprint: [u8; 32],
        workout: WorkoutData,
    ) -> Result<()> {
        instructions::submit_workout(ctx, fingerprint, workout)
    }

    pub fn mint_reward(ctx: Context<MintReward>, amount: u64, reason: String) -> Result<()> {
        instructions::mint_reward(ctx, amount, reason)
    }

    // ────────────────────────────────────────────────────────────────────────────
    ///  ATHLETE FUNCTIONS
    // ────────────────────────────────────────────────────────────────────────────
    pub fn register_player(ctx: Context<RegisterPlayer>) -> Result<()> {
        instructions::register_player(ctx)
    }

    pub fn mint_collectible(
        ctx: Context<MintCollectible>,
        rarity: Rarity,
        item_class: ItemClass,
    ) -> Result<()> {
        instructions::mint_collectible(ctx, rarity, item_class)
    }

    pub fn stake_collectible(ctx: Context<StakeCollectible>, collectible_id: u64) -> Result<()> {
        instructions::stake_collectible(ctx, collectible_id)
    }

    pub fn unstake_collectible(ctx: Context<StakeCollectible>, collectible_id: u64) -> Result<()> {
        instructions::unstake_collectible(ctx, collectible_id)
    }

    pub fn claim_tokens(ctx: Context<ClaimTokens>) -> Result<()> {
        instructions::claim_tokens(ctx)
    }
}

fn enforce_admin(key: &Pubkey) -> Result<()> {
    #[cfg(not(feature = "test"))]
    require!(
        *key == Pubkey::from_str(ADMIN).unwrap(),
        FixierunError::Unauthorized
    );
    Ok(())
}
