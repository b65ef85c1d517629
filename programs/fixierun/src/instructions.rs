use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{self, Mint, MintTo, Token, TokenAccount, Transfer},
};

use crate::{constants::*, errors::FixierunError, helpers::*, state::*};

#[event]
pub struct WorkoutValidated {
    pub owner: Pubkey,
    pub distance_meters: u64,
    pub tokens_earned: u64,
    pub streak: u32,
}

#[event]
pub struct StreakBonus {
    pub owner: Pubkey,
    pub streak: u32,
    pub bonus: u64,
}

#[event]
pub struct TokensMinted {
    pub to: Pubkey,
    pub amount: u64,
    pub reason: String,
}

#[event]
pub struct TokensClaimed {
    pub player: Pubkey,
    pub amount: u64,
}

#[event]
pub struct PlayerRegistered {
    pub player_wallet: Pubkey,
    pub player_account: Pubkey,
}

#[event]
pub struct CollectibleMinted {
    pub owner: Pubkey,
    pub collectible_id: u64,
    pub rarity: Rarity,
    pub item_class: ItemClass,
    pub speed_boost: u16,
    pub reward_boost: u16,
    pub experience_boost: u16,
}

#[event]
pub struct CollectibleLevelUp {
    pub owner: Pubkey,
    pub collectible_id: u64,
    pub new_level: u16,
}

#[event]
pub struct CollectibleStaked {
    pub owner: Pubkey,
    pub collectible_id: u64,
    pub timestamp: i64,
}

#[event]
pub struct CollectibleUnstaked {
    pub owner: Pubkey,
    pub collectible_id: u64,
}

#[event]
pub struct MinterAdded {
    pub minter: Pubkey,
}

#[event]
pub struct MinterRemoved {
    pub minter: Pubkey,
}

#[event]
pub struct ValidatorAdded {
    pub validator: Pubkey,
}

#[event]
pub struct ValidatorRemoved {
    pub validator: Pubkey,
}

#[event]
pub struct ProductionToggled {
    pub enabled: bool,
}

/// ────────────────────────────────────────────────────────────────────────────
/// INTERNAL: reward state machine
/// ────────────────────────────────────────────────────────────────────────────

fn ensure_production(gs: &GlobalState) -> Result<()> {
    require!(gs.production_enabled, FixierunError::ProductionDisabled);
    Ok(())
}

/// Admission gate for a workout submission: record integrity, dedup,
/// timestamp sanity, freshness. Reads only, so a rejection here cannot
/// leave a partial trace.
fn admit_workout(
    gs: &GlobalState,
    receipt: &WorkoutReceipt,
    owner: &Pubkey,
    workout: &WorkoutData,
    fingerprint: [u8; 32],
    now: i64,
) -> Result<()> {
    // The receipt PDA is derived from the fingerprint the validator signed
    // over; recompute it so a mismatched record cannot ride a fresh PDA.
    require!(
        workout_fingerprint(owner, workout) == fingerprint,
        FixierunError::FingerprintMismatch
    );
    require!(!receipt.processed, FixierunError::DuplicateWorkout);
    require!(workout.timestamp <= now, FixierunError::InvalidTimestamp);
    require!(
        now - workout.timestamp <= gs.freshness_window_seconds,
        FixierunError::StaleWorkout
    );
    Ok(())
}

#[derive(Debug)]
struct WorkoutOutcome {
    tokens_earned: u64,
    streak: u32,
    streak_bonus: u64,
    level_ups: Vec<(u64, u16)>,
}

/// Applies one validated workout to the ledger and the athlete's equipment.
/// Every fallible check runs before the first mutation, so a failure leaves
/// both accounts byte-identical to their pre-call state.
fn process_workout(
    gs: &mut GlobalState,
    player: &mut Player,
    workout: &WorkoutData,
    day: u64,
) -> Result<WorkoutOutcome> {
    // Equipped boosts; every id must belong to the submitting athlete and
    // may appear only once, so a repeated id cannot stack its own boost.
    let mut reward_boost_total: u64 = 0;
    for (i, id) in workout.equipped_collectibles.iter().enumerate() {
        require!(
            !workout.equipped_collectibles[..i].contains(id),
            FixierunError::DuplicateEquipment
        );
        let collectible = player
            .collectible(*id)
            .ok_or(FixierunError::CollectibleNotOwned)?;
        reward_boost_total = reward_boost_total.saturating_add(collectible.reward_boost as u64);
    }

    // Streak transition, staged until the caps clear.
    let day_advanced = player.last_activity_day != day;
    let new_streak = if !day_advanced {
        player.streak
    } else if player.last_activity_day + 1 == day {
        player.streak.saturating_add(1)
    } else {
        1
    };

    let base = base_reward(workout.kind, workout.distance_meters);
    let boosted = base.saturating_add(base.saturating_mul(reward_boost_total) / 100);
    let multiplied = boosted.saturating_mul(streak_multiplier_percent(new_streak)) / 100;
    let tokens_earned = multiplied.saturating_add(milestone_bonus(workout.distance_meters));

    // Weekly flat bonus: 1 FIXIE per streak day, only on the submission
    // that advances the streak onto a multiple of the interval.
    let streak_bonus = if day_advanced && new_streak % STREAK_BONUS_INTERVAL == 0 {
        (new_streak as u64).saturating_mul(MICROTOKENS_PER_TOKEN)
    } else {
        0
    };

    // Both credits clear the supply and daily caps as one unit.
    gs.checked_issue(tokens_earned.saturating_add(streak_bonus), day)?;

    // Effects
    player.streak = new_streak;
    player.last_activity_day = day;
    player.balance = player
        .balance
        .saturating_add(tokens_earned)
        .saturating_add(streak_bonus);
    player.total_rewards = player
        .total_rewards
        .saturating_add(tokens_earned)
        .saturating_add(streak_bonus);
    player.total_workouts = player.total_workouts.saturating_add(1);
    player.total_distance_meters = player
        .total_distance_meters
        .saturating_add(workout.distance_meters);
    gs.total_workouts = gs.total_workouts.saturating_add(1);

    let experience = workout.distance_meters / EXPERIENCE_DIVISOR_METERS;
    let mut level_ups = Vec::new();
    for id in &workout.equipped_collectibles {
        if let Some(collectible) = player.collectible_mut(*id) {
            if let Some(new_level) = collectible.grant_experience(experience) {
                level_ups.push((*id, new_level));
            }
        }
    }

    Ok(WorkoutOutcome {
        tokens_earned,
        streak: new_streak,
        streak_bonus,
        level_ups,
    })
}

/// Burn-to-mint: debits the purchase cost from the athlete's earned balance
/// and appends a freshly rolled collectible. Checks precede all effects.
fn create_collectible(
    gs: &mut GlobalState,
    player: &mut Player,
    rarity: Rarity,
    item_class: ItemClass,
    seed: &[u8],
) -> Result<Collectible> {
    require!(
        player.collectibles.len() < MAX_COLLECTIBLES_PER_PLAYER,
        FixierunError::CollectibleLimitReached
    );
    let cost = rarity.mint_cost();
    player.debit(cost)?;
    gs.burned_tokens = gs.burned_tokens.saturating_add(cost);

    let id = gs.total_collectibles.saturating_add(1);
    gs.total_collectibles = id;

    let collectible = Collectible {
        id,
        rarity,
        item_class,
        level: 1,
        experience: 0,
        speed_boost: derive_boost(seed, b"speed", rarity),
        reward_boost: derive_boost(seed, b"reward", rarity),
        experience_boost: derive_boost(seed, b"experience", rarity),
        staked: false,
        staked_at: 0,
    };
    player.collectibles.push(collectible.clone());
    Ok(collectible)
}

/// ────────────────────────────────────────────────────────────────────────────
/// INITIALIZE
/// ────────────────────────────────────────────────────────────────────────────
#[derive(Accounts)]
pub struct InitializeProgram<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,
    #[account(
        init,
        payer = authority,
        space = 8  /* discriminator */
        + 32 + 32 + 32          /* authority + mint + vault */
        + 8 + 8                 /* max_supply + daily_emission_cap */
        + 8 + 8                 /* total_issued + burned_tokens */
        + 8 + 8                 /* day_index + day_issued */
        + 8 + 1                 /* freshness_window + production_enabled */
        + (4 + 32 * MAX_ROSTER_SIZE) * 2 /* minter + validator rosters */
        + 8 + 8                 /* total_collectibles + total_workouts */
        + 64, /* padding for future expansion */
        seeds = [GLOBAL_STATE_SEED, token_mint.key().as_ref()],
        bump
    )]
    pub global_state: Account<'info, GlobalState>,
    #[account(
        init,
        payer = authority,
        token::mint = token_mint,
        token::authority = global_state,
        seeds = [REWARDS_VAULT_SEED, token_mint.key().as_ref()],
        bump
    )]
    pub rewards_vault: Account<'info, TokenAccount>,
    #[account(
        mut,
        constraint = token_mint.mint_authority.unwrap() == global_state.key() @ FixierunError::InvalidTokenMint
    )]
    pub token_mint: Account<'info, Mint>,
    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn initialize_program(
    ctx: Context<InitializeProgram>,
    max_supply: u64,
    daily_emission_cap: u64,
    freshness_window_seconds: Option<i64>,
) -> Result<()> {
    require!(max_supply > 0, FixierunError::InvalidParameter);
    require!(
        daily_emission_cap > 0 && daily_emission_cap <= max_supply,
        FixierunError::InvalidParameter
    );
    let freshness = freshness_window_seconds.unwrap_or(DEFAULT_FRESHNESS_WINDOW_SECONDS);
    require!(freshness > 0, FixierunError::InvalidParameter);

    let gs = &mut ctx.accounts.global_state;
    gs.authority = ctx.accounts.authority.key();
    gs.token_mint = ctx.accounts.token_mint.key();
    gs.rewards_vault = ctx.accounts.rewards_vault.key();

    gs.max_supply = max_supply;
    gs.daily_emission_cap = daily_emission_cap;
    gs.total_issued = 0;
    gs.burned_tokens = 0;
    gs.day_index = 0;
    gs.day_issued = 0;

    gs.freshness_window_seconds = freshness;
    gs.production_enabled = true;

    gs.minters = Vec::new();
    gs.validators = Vec::new();

    gs.total_collectibles = 0;
    gs.total_workouts = 0;

    // Premint the whole supply into the rewards vault and revoke the mint
    // authority; from here on, issuance is the state accounting above and
    // claims are vault transfers.
    let preminted_supply = ctx.accounts.token_mint.supply;
    let amount_to_mint = max_supply.saturating_sub(preminted_supply);

    let token_mint_key = ctx.accounts.token_mint.key();
    let seeds = &[
        GLOBAL_STATE_SEED,
        token_mint_key.as_ref(),
        &[ctx.bumps.global_state],
    ];
    let signer = &[&seeds[..]];

    if amount_to_mint > 0 {
        token::mint_to(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                MintTo {
                    mint: ctx.accounts.token_mint.to_account_info(),
                    to: ctx.accounts.rewards_vault.to_account_info(),
                    authority: gs.to_account_info(),
                },
                signer,
            ),
            amount_to_mint,
        )?;
    }

    token::set_authority(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            token::SetAuthority {
                current_authority: gs.to_account_info(),
                account_or_mint: ctx.accounts.token_mint.to_account_info(),
            },
            signer,
        ),
        token::spl_token::instruction::AuthorityType::MintTokens,
        None,
    )?;

    Ok(())
}

/// ────────────────────────────────────────────────────────────────────────────
///  ADMIN: PRODUCTION TOGGLE, PARAMETERS, ROSTERS
/// ────────────────────────────────────────────────────────────────────────────
#[derive(Accounts)]
pub struct AdminAction<'info> {
    pub authority: Signer<'info>,
    #[account(
        mut,
        has_one = authority @ FixierunError::Unauthorized,
        has_one = token_mint @ FixierunError::InvalidTokenMint,
        seeds = [GLOBAL_STATE_SEED, token_mint.key().as_ref()],
        bump,
    )]
    pub global_state: Account<'info, GlobalState>,
    pub token_mint: Account<'info, Mint>,
}

pub fn toggle_production(ctx: Context<AdminAction>, enable: bool) -> Result<()> {
    ctx.accounts.global_state.production_enabled = enable;
    emit!(ProductionToggled { enabled: enable });
    Ok(())
}

pub fn update_parameters(
    ctx: Context<AdminAction>,
    freshness_window_seconds: Option<i64>,
) -> Result<()> {
    let gs = &mut ctx.accounts.global_state;
    if let Some(freshness) = freshness_window_seconds {
        require!(freshness > 0, FixierunError::InvalidParameter);
        gs.freshness_window_seconds = freshness;
        msg!("freshness window set to {}s", freshness);
    }
    Ok(())
}

pub fn add_minter(ctx: Context<AdminAction>, minter: Pubkey) -> Result<()> {
    GlobalState::add_to_roster(&mut ctx.accounts.global_state.minters, minter)?;
    emit!(MinterAdded { minter });
    Ok(())
}

pub fn remove_minter(ctx: Context<AdminAction>, minter: Pubkey) -> Result<()> {
    GlobalState::remove_from_roster(&mut ctx.accounts.global_state.minters, &minter)?;
    emit!(MinterRemoved { minter });
    Ok(())
}

pub fn add_validator(ctx: Context<AdminAction>, validator: Pubkey) -> Result<()> {
    GlobalState::add_to_roster(&mut ctx.accounts.global_state.validators, validator)?;
    emit!(ValidatorAdded { validator });
    Ok(())
}

pub fn remove_validator(ctx: Context<AdminAction>, validator: Pubkey) -> Result<()> {
    GlobalState::remove_from_roster(&mut ctx.accounts.global_state.validators, &validator)?;
    emit!(ValidatorRemoved { validator });
    Ok(())
}

/// ────────────────────────────────────────────────────────────────────────────
///  REGISTER PLAYER
/// ────────────────────────────────────────────────────────────────────────────
#[derive(Accounts)]
pub struct RegisterPlayer<'info> {
    #[account(mut)]
    pub player_wallet: Signer<'info>,
    #[account(
        init,
        payer = player_wallet,
        space = 8      // discriminator
            + 32       // owner: Pubkey
            + 8        // balance: u64
            + 4 + 8    // streak: u32 + last_activity_day: u64
            + 8 + 8 + 8 // total_rewards + total_workouts + total_distance_meters
            + 4 + Collectible::SIZE * MAX_COLLECTIBLES_PER_PLAYER // collectibles vec
            + 64,      // padding for future expansion
        seeds = [PLAYER_SEED, player_wallet.key().as_ref(), token_mint.key().as_ref()],
        bump
    )]
    pub player: Box<Account<'info, Player>>,
    #[account(
        seeds = [GLOBAL_STATE_SEED, token_mint.key().as_ref()],
        bump,
        has_one = token_mint @ FixierunError::InvalidTokenMint,
    )]
    pub global_state: Account<'info, GlobalState>,
    pub token_mint: Account<'info, Mint>,
    pub system_program: Program<'info, System>,
}

pub fn register_player(ctx: Context<RegisterPlayer>) -> Result<()> {
    let player = &mut ctx.accounts.player;
    player.owner = ctx.accounts.player_wallet.key();
    player.balance = 0;
    player.streak = 0;
    player.last_activity_day = 0;
    player.total_rewards = 0;
    player.total_workouts = 0;
    player.total_distance_meters = 0;
    player.collectibles = Vec::new();

    emit!(PlayerRegistered {
        player_wallet: ctx.accounts.player_wallet.key(),
        player_account: player.key(),
    });
    Ok(())
}

/// ────────────────────────────────────────────────────────────────────────────
///  SUBMIT WORKOUT
/// ────────────────────────────────────────────────────────────────────────────
#[derive(Accounts)]
#[instruction(fingerprint: [u8; 32])]
pub struct SubmitWorkout<'info> {
    #[account(mut)]
    pub validator: Signer<'info>,
    /// CHECK: the athlete's wallet; the player PDA derivation binds it
    pub owner_wallet: AccountInfo<'info>,
    #[account(
        mut,
        seeds = [GLOBAL_STATE_SEED, token_mint.key().as_ref()],
        bump,
        has_one = token_mint @ FixierunError::InvalidTokenMint,
    )]
    pub global_state: Account<'info, GlobalState>,
    #[account(
        mut,
        constraint = player.owner == owner_wallet.key() @ FixierunError::Unauthorized,
        seeds = [PLAYER_SEED, owner_wallet.key().as_ref(), token_mint.key().as_ref()],
        bump
    )]
    pub player: Box<Account<'info, Player>>,
    #[account(
        init_if_needed,
        payer = validator,
        space = 8 + 32 + 32 + 8 + 8 + 1,
        seeds = [WORKOUT_SEED, fingerprint.as_ref()],
        bump
    )]
    pub workout_receipt: Account<'info, WorkoutReceipt>,
    pub token_mint: Account<'info, Mint>,
    pub system_program: Program<'info, System>,
}

pub fn submit_workout(
    ctx: Context<SubmitWorkout>,
    fingerprint: [u8; 32],
    workout: WorkoutData,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let gs = &mut ctx.accounts.global_state;
    let player = &mut ctx.accounts.player;
    let receipt = &mut ctx.accounts.workout_receipt;
    let owner = ctx.accounts.owner_wallet.key();

    ensure_production(gs)?;
    require!(
        gs.is_validator(&ctx.accounts.validator.key()),
        FixierunError::Unauthorized
    );
    admit_workout(gs, receipt, &owner, &workout, fingerprint, now)?;

    let day = day_index(now);
    let outcome = process_workout(gs, player, &workout, day)?;

    // Dedup commit rides the same transaction as the credit: a failure
    // anywhere above reverts the receipt along with the counters.
    receipt.fingerprint = fingerprint;
    receipt.owner = owner;
    receipt.day = day;
    receipt.tokens_earned = outcome.tokens_earned;
    receipt.processed = true;

    for (collectible_id, new_level) in &outcome.level_ups {
        emit!(CollectibleLevelUp {
            owner,
            collectible_id: *collectible_id,
            new_level: *new_level,
        });
    }
    if outcome.streak_bonus > 0 {
        // The bonus is its own credit record; WorkoutValidated carries only
        // the workout reward.
        emit!(TokensMinted {
            to: owner,
            amount: outcome.streak_bonus,
            reason: String::from("Streak Bonus"),
        });
        emit!(StreakBonus {
            owner,
            streak: outcome.streak,
            bonus: outcome.streak_bonus,
        });
    }
    emit!(WorkoutValidated {
        owner,
        distance_meters: workout.distance_meters,
        tokens_earned: outcome.tokens_earned,
        streak: outcome.streak,
    });

    Ok(())
}

/// ────────────────────────────────────────────────────────────────────────────
///  MINT REWARD (roster minters, same caps as workout credits)
/// ────────────────────────────────────────────────────────────────────────────
#[derive(Accounts)]
pub struct MintReward<'info> {
    pub minter: Signer<'info>,
    /// CHECK: recipient wallet; the player PDA derivation binds it
    pub owner_wallet: AccountInfo<'info>,
    #[account(
        mut,
        seeds = [GLOBAL_STATE_SEED, token_mint.key().as_ref()],
        bump,
        has_one = token_mint @ FixierunError::InvalidTokenMint,
    )]
    pub global_state: Account<'info, GlobalState>,
    #[account(
        mut,
        constraint = player.owner == owner_wallet.key() @ FixierunError::Unauthorized,
        seeds = [PLAYER_SEED, owner_wallet.key().as_ref(), token_mint.key().as_ref()],
        bump
    )]
    pub player: Box<Account<'info, Player>>,
    pub token_mint: Account<'info, Mint>,
}

pub fn mint_reward(ctx: Context<MintReward>, amount: u64, reason: String) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let gs = &mut ctx.accounts.global_state;
    let player = &mut ctx.accounts.player;

    ensure_production(gs)?;
    require!(
        gs.is_minter(&ctx.accounts.minter.key()),
        FixierunError::Unauthorized
    );
    require!(amount > 0, FixierunError::InvalidParameter);

    gs.checked_issue(amount, day_index(now))?;
    player.balance = player.balance.saturating_add(amount);
    player.total_rewards = player.total_rewards.saturating_add(amount);

    emit!(TokensMinted {
        to: player.owner,
        amount,
        reason,
    });
    Ok(())
}

/// ────────────────────────────────────────────────────────────────────────────
///  MINT COLLECTIBLE (burn-to-mint)
/// ────────────────────────────────────────────────────────────────────────────
#[derive(Accounts)]
pub struct MintCollectible<'info> {
    pub player_wallet: Signer<'info>,
    #[account(
        mut,
        seeds = [GLOBAL_STATE_SEED, token_mint.key().as_ref()],
        bump,
        has_one = token_mint @ FixierunError::InvalidTokenMint,
    )]
    pub global_state: Account<'info, GlobalState>,
    #[account(
        mut,
        constraint = player.owner == player_wallet.key() @ FixierunError::Unauthorized,
        seeds = [PLAYER_SEED, player_wallet.key().as_ref(), token_mint.key().as_ref()],
        bump
    )]
    pub player: Box<Account<'info, Player>>,
    pub token_mint: Account<'info, Mint>,
}

pub fn mint_collectible(
    ctx: Context<MintCollectible>,
    rarity: Rarity,
    item_class: ItemClass,
) -> Result<()> {
    let clock = Clock::get()?;
    let gs = &mut ctx.accounts.global_state;
    let player = &mut ctx.accounts.player;

    ensure_production(gs)?;

    // Stat seed: clock data plus owner and the allocated id, hashed per
    // stat label in derive_boost. See the caveat there.
    let mut seed = Vec::with_capacity(56);
    seed.extend_from_slice(&clock.slot.to_le_bytes());
    seed.extend_from_slice(&clock.unix_timestamp.to_le_bytes());
    seed.extend_from_slice(ctx.accounts.player_wallet.key().as_ref());
    seed.extend_from_slice(&gs.total_collectibles.saturating_add(1).to_le_bytes());

    let collectible = create_collectible(gs, player, rarity, item_class, &seed)?;

    emit!(CollectibleMinted {
        owner: player.owner,
        collectible_id: collectible.id,
        rarity: collectible.rarity,
        item_class: collectible.item_class,
        speed_boost: collectible.speed_boost,
        reward_boost: collectible.reward_boost,
        experience_boost: collectible.experience_boost,
    });
    Ok(())
}

/// ────────────────────────────────────────────────────────────────────────────
///  GRANT EXPERIENCE (admin path; the engine path runs inside submit_workout)
/// ────────────────────────────────────────────────────────────────────────────
#[derive(Accounts)]
pub struct GrantExperience<'info> {
    pub authority: Signer<'info>,
    /// CHECK: the collectible owner's wallet; the player PDA derivation binds it
    pub owner_wallet: AccountInfo<'info>,
    #[account(
        has_one = authority @ FixierunError::Unauthorized,
        has_one = token_mint @ FixierunError::InvalidTokenMint,
        seeds = [GLOBAL_STATE_SEED, token_mint.key().as_ref()],
        bump,
    )]
    pub global_state: Account<'info, GlobalState>,
    #[account(
        mut,
        seeds = [PLAYER_SEED, owner_wallet.key().as_ref(), token_mint.key().as_ref()],
        bump
    )]
    pub player: Box<Account<'info, Player>>,
    pub token_mint: Account<'info, Mint>,
}

pub fn grant_experience(
    ctx: Context<GrantExperience>,
    collectible_id: u64,
    amount: u64,
) -> Result<()> {
    ensure_production(&ctx.accounts.global_state)?;
    let player = &mut ctx.accounts.player;
    let owner = player.owner;
    let collectible = player
        .collectible_mut(collectible_id)
        .ok_or(FixierunError::CollectibleNotFound)?;

    if let Some(new_level) = collectible.grant_experience(amount) {
        emit!(CollectibleLevelUp {
            owner,
            collectible_id,
            new_level,
        });
    }
    Ok(())
}

/// ────────────────────────────────────────────────────────────────────────────
///  STAKE / UNSTAKE COLLECTIBLE
/// ────────────────────────────────────────────────────────────────────────────
#[derive(Accounts)]
pub struct StakeCollectible<'info> {
    pub player_wallet: Signer<'info>,
    #[account(
        mut,
        constraint = player.owner == player_wallet.key() @ FixierunError::Unauthorized,
        seeds = [PLAYER_SEED, player_wallet.key().as_ref(), token_mint.key().as_ref()],
        bump
    )]
    pub player: Box<Account<'info, Player>>,
    #[account(
        seeds = [GLOBAL_STATE_SEED, token_mint.key().as_ref()],
        bump,
        has_one = token_mint @ FixierunError::InvalidTokenMint,
    )]
    pub global_state: Account<'info, GlobalState>,
    pub token_mint: Account<'info, Mint>,
}

pub fn stake_collectible(ctx: Context<StakeCollectible>, collectible_id: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    ensure_production(&ctx.accounts.global_state)?;
    let player = &mut ctx.accounts.player;
    let owner = player.owner;
    let collectible = player
        .collectible_mut(collectible_id)
        .ok_or(FixierunError::NotOwner)?;

    require!(!collectible.staked, FixierunError::AlreadyStaked);
    collectible.staked = true;
    collectible.staked_at = now;

    emit!(CollectibleStaked {
        owner,
        collectible_id,
        timestamp: now,
    });
    Ok(())
}

pub fn unstake_collectible(ctx: Context<StakeCollectible>, collectible_id: u64) -> Result<()> {
    ensure_production(&ctx.accounts.global_state)?;
    let player = &mut ctx.accounts.player;
    let owner = player.owner;
    let collectible = player
        .collectible_mut(collectible_id)
        .ok_or(FixierunError::NotOwner)?;

    require!(collectible.staked, FixierunError::NotStaked);
    collectible.staked = false;
    collectible.staked_at = 0;

    emit!(CollectibleUnstaked {
        owner,
        collectible_id,
    });
    Ok(())
}

/// ────────────────────────────────────────────────────────────────────────────
///  CLAIM TOKENS (ledger balance -> SPL from the rewards vault)
/// ────────────────────────────────────────────────────────────────────────────
#[derive(Accounts)]
pub struct ClaimTokens<'info> {
    #[account(mut)]
    pub player_wallet: Signer<'info>,
    #[account(
        mut,
        constraint = player.owner == player_wallet.key() @ FixierunError::Unauthorized,
        seeds = [PLAYER_SEED, player_wallet.key().as_ref(), token_mint.key().as_ref()],
        bump
    )]
    pub player: Box<Account<'info, Player>>,
    #[account(
        seeds = [GLOBAL_STATE_SEED, token_mint.key().as_ref()],
        bump,
        has_one = token_mint @ FixierunError::InvalidTokenMint,
    )]
    pub global_state: Account<'info, GlobalState>,
    #[account(
        mut,
        seeds = [REWARDS_VAULT_SEED, token_mint.key().as_ref()],
        bump,
    )]
    pub rewards_vault: Account<'info, TokenAccount>,
    #[account(
        init_if_needed,
        payer = player_wallet,
        associated_token::mint = token_mint,
        associated_token::authority = player_wallet,
    )]
    pub player_token_account: Box<Account<'info, TokenAccount>>,
    pub token_mint: Account<'info, Mint>,
    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn claim_tokens(ctx: Context<ClaimTokens>) -> Result<()> {
    let player = &mut ctx.accounts.player;
    let amount = player.balance;
    require!(amount > 0, FixierunError::NothingToClaim);

    player.balance = 0;

    let token_mint_key = ctx.accounts.token_mint.key();
    let seeds = &[
        GLOBAL_STATE_SEED,
        token_mint_key.as_ref(),
        &[ctx.bumps.global_state],
    ];
    let signer = &[&seeds[..]];

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.rewards_vault.to_account_info(),
                to: ctx.accounts.player_token_account.to_account_info(),
                authority: ctx.accounts.global_state.to_account_info(),
            },
            signer,
        ),
        amount,
    )?;

    emit!(TokensClaimed {
        player: player.owner,
        amount,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_global_state() -> GlobalState {
        GlobalState {
            authority: Pubkey::new_unique(),
            token_mint: Pubkey::new_unique(),
            rewards_vault: Pubkey::new_unique(),
            max_supply: DEFAULT_MAX_SUPPLY,
            daily_emission_cap: DEFAULT_DAILY_EMISSION_CAP,
            total_issued: 0,
            burned_tokens: 0,
            day_index: 0,
            day_issued: 0,
            freshness_window_seconds: DEFAULT_FRESHNESS_WINDOW_SECONDS,
            production_enabled: true,
            minters: Vec::new(),
            validators: Vec::new(),
            total_collectibles: 0,
            total_workouts: 0,
        }
    }

    fn test_player() -> Player {
        Player {
            owner: Pubkey::new_unique(),
            balance: 0,
            streak: 0,
            last_activity_day: 0,
            total_rewards: 0,
            total_workouts: 0,
            total_distance_meters: 0,
            collectibles: Vec::new(),
        }
    }

    fn workout(distance_meters: u64, kind: ActivityKind) -> WorkoutData {
        WorkoutData {
            distance_meters,
            duration_seconds: 1_800,
            calories: 400,
            kind,
            timestamp: 1_700_000_000,
            equipped_collectibles: vec![],
        }
    }

    fn collectible_with_reward_boost(id: u64, reward_boost: u16) -> Collectible {
        Collectible {
            id,
            rarity: Rarity::Uncommon,
            item_class: ItemClass::Sneaker,
            level: 1,
            experience: 0,
            speed_boost: 3,
            reward_boost,
            experience_boost: 3,
            staked: false,
            staked_at: 0,
        }
    }

    #[test]
    fn five_km_run_credits_eleven_tokens() {
        let mut gs = test_global_state();
        let mut player = test_player();

        // 5 * 1.2 = 6.0 base, 100% multiplier, +5 milestone
        let outcome =
            process_workout(&mut gs, &mut player, &workout(5_000, ActivityKind::Running), 100)
                .unwrap();
        assert_eq!(outcome.tokens_earned, 11 * MICROTOKENS_PER_TOKEN);
        assert_eq!(outcome.streak, 1);
        assert_eq!(outcome.streak_bonus, 0);
        assert_eq!(player.balance, 11 * MICROTOKENS_PER_TOKEN);
        assert_eq!(player.streak, 1);
        assert_eq!(gs.total_issued, 11 * MICROTOKENS_PER_TOKEN);
        assert_eq!(gs.day_issued, 11 * MICROTOKENS_PER_TOKEN);
        assert_eq!(gs.total_workouts, 1);
    }

    #[test]
    fn boosted_cycling_on_seventh_day_pays_weekly_bonus() {
        let mut gs = test_global_state();
        let mut player = test_player();
        player.streak = 6;
        player.last_activity_day = 99;
        player.collectibles.push(collectible_with_reward_boost(1, 10));

        let mut w = workout(10_000, ActivityKind::Cycling);
        w.equipped_collectibles = vec![1];

        // base 8.0, +10% boost = 8.8, x115% = 10.12, +10 milestone = 20.12
        let outcome = process_workout(&mut gs, &mut player, &w, 100).unwrap();
        assert_eq!(outcome.tokens_earned, 20_120_000);
        assert_eq!(outcome.streak, 7);
        assert_eq!(outcome.streak_bonus, 7 * MICROTOKENS_PER_TOKEN);
        assert_eq!(player.balance, 27_120_000);
        assert_eq!(gs.total_issued, 27_120_000);
        // 10km grants 100 xp, not enough to level
        assert!(outcome.level_ups.is_empty());
        assert_eq!(player.collectibles[0].experience, 100);
        assert_eq!(player.collectibles[0].level, 1);
    }

    #[test]
    fn same_day_repeat_keeps_streak_and_skips_weekly_bonus() {
        let mut gs = test_global_state();
        let mut player = test_player();
        player.streak = 7;
        player.last_activity_day = 100;

        let outcome =
            process_workout(&mut gs, &mut player, &workout(2_000, ActivityKind::Walking), 100)
                .unwrap();
        assert_eq!(outcome.streak, 7);
        // streak stayed on a multiple of 7 but the day did not advance
        assert_eq!(outcome.streak_bonus, 0);
        assert_eq!(player.last_activity_day, 100);
    }

    #[test]
    fn gap_resets_streak() {
        let mut gs = test_global_state();
        let mut player = test_player();
        player.streak = 12;
        player.last_activity_day = 100;

        let outcome =
            process_workout(&mut gs, &mut player, &workout(2_000, ActivityKind::Walking), 103)
                .unwrap();
        assert_eq!(outcome.streak, 1);
        assert_eq!(player.last_activity_day, 103);
    }

    #[test]
    fn consecutive_days_build_streak_and_weekly_bonus_fires_on_seventh() {
        let mut gs = test_global_state();
        let mut player = test_player();

        for day in 1..=7 {
            let outcome =
                process_workout(&mut gs, &mut player, &workout(1_000, ActivityKind::Walking), day)
                    .unwrap();
            assert_eq!(outcome.streak, day as u32);
            if day == 7 {
                assert_eq!(outcome.streak_bonus, 7 * MICROTOKENS_PER_TOKEN);
            } else {
                assert_eq!(outcome.streak_bonus, 0);
            }
        }
        assert_eq!(player.streak, 7);
    }

    #[test]
    fn unowned_equipment_aborts_without_state_change() {
        let mut gs = test_global_state();
        let mut player = test_player();
        player.collectibles.push(collectible_with_reward_boost(1, 10));

        let mut w = workout(5_000, ActivityKind::Running);
        w.equipped_collectibles = vec![1, 99];

        let err = process_workout(&mut gs, &mut player, &w, 100).unwrap_err();
        assert_eq!(err, FixierunError::CollectibleNotOwned.into());
        assert_eq!(player.balance, 0);
        assert_eq!(player.streak, 0);
        assert_eq!(gs.total_issued, 0);
        assert_eq!(gs.total_workouts, 0);
        assert_eq!(player.collectibles[0].experience, 0);
    }

    #[test]
    fn daily_cap_rejection_leaves_state_untouched() {
        let mut gs = test_global_state();
        let mut player = test_player();
        gs.day_index = 100;
        gs.day_issued = gs.daily_emission_cap - MICROTOKENS_PER_TOKEN;
        gs.total_issued = gs.day_issued;

        let before_day_issued = gs.day_issued;
        let err = process_workout(
            &mut gs,
            &mut player,
            &workout(5_000, ActivityKind::Running),
            100,
        )
        .unwrap_err();
        assert_eq!(err, FixierunError::DailyEmissionExceeded.into());
        assert_eq!(gs.day_issued, before_day_issued);
        assert_eq!(player.balance, 0);
        assert_eq!(player.streak, 0);
        assert_eq!(player.last_activity_day, 0);
    }

    #[test]
    fn day_boundary_resets_daily_counter() {
        let mut gs = test_global_state();
        let mut player = test_player();
        gs.day_index = 100;
        gs.day_issued = gs.daily_emission_cap;
        gs.total_issued = gs.day_issued;

        // blocked today, accepted tomorrow
        let err = process_workout(
            &mut gs,
            &mut player,
            &workout(5_000, ActivityKind::Running),
            100,
        )
        .unwrap_err();
        assert_eq!(err, FixierunError::DailyEmissionExceeded.into());

        process_workout(&mut gs, &mut player, &workout(5_000, ActivityKind::Running), 101)
            .unwrap();
        assert_eq!(gs.day_index, 101);
        assert_eq!(gs.day_issued, 11 * MICROTOKENS_PER_TOKEN);
    }

    #[test]
    fn supply_cap_enforced_on_live_supply() {
        let mut gs = test_global_state();
        let mut player = test_player();
        gs.max_supply = 100 * MICROTOKENS_PER_TOKEN;
        gs.daily_emission_cap = gs.max_supply;
        gs.total_issued = 95 * MICROTOKENS_PER_TOKEN;

        let err = process_workout(
            &mut gs,
            &mut player,
            &workout(5_000, ActivityKind::Running),
            100,
        )
        .unwrap_err();
        assert_eq!(err, FixierunError::SupplyExceeded.into());

        // burns free headroom: live supply is issued minus burned
        gs.burned_tokens = 10 * MICROTOKENS_PER_TOKEN;
        process_workout(&mut gs, &mut player, &workout(5_000, ActivityKind::Running), 100)
            .unwrap();
        assert_eq!(gs.total_issued, 106 * MICROTOKENS_PER_TOKEN);
    }

    #[test]
    fn marathon_levels_equipped_collectible() {
        let mut gs = test_global_state();
        let mut player = test_player();
        player.collectibles.push(collectible_with_reward_boost(1, 3));

        let mut w = workout(100_000, ActivityKind::Cycling);
        w.equipped_collectibles = vec![1];

        let outcome = process_workout(&mut gs, &mut player, &w, 100).unwrap();
        assert_eq!(outcome.level_ups, vec![(1, 2)]);
        let c = &player.collectibles[0];
        assert_eq!(c.experience, 1_000);
        assert_eq!(c.level, 2);
        // every boost gained the per-level increment
        assert_eq!(c.speed_boost, 3 + BOOST_INCREMENT_PER_LEVEL);
        assert_eq!(c.reward_boost, 3 + BOOST_INCREMENT_PER_LEVEL);
        assert_eq!(c.experience_boost, 3 + BOOST_INCREMENT_PER_LEVEL);
    }

    #[test]
    fn leveling_law_holds_across_grants() {
        let mut c = collectible_with_reward_boost(1, 5);
        let mut last_reward_boost = c.reward_boost;
        for grant in [100u64, 900, 1, 2_499, 10_000] {
            c.grant_experience(grant);
            assert_eq!(c.level, level_for_experience(c.experience));
            assert!(c.reward_boost >= last_reward_boost);
            last_reward_boost = c.reward_boost;
        }
    }

    #[test]
    fn burn_to_mint_debits_balance_and_counts_burn() {
        let mut gs = test_global_state();
        let mut player = test_player();
        player.balance = 30 * MICROTOKENS_PER_TOKEN;

        let minted =
            create_collectible(&mut gs, &mut player, Rarity::Common, ItemClass::Bike, b"seed")
                .unwrap();
        assert_eq!(minted.id, 1);
        assert_eq!(minted.level, 1);
        assert_eq!(player.balance, 20 * MICROTOKENS_PER_TOKEN);
        assert_eq!(gs.burned_tokens, 10 * MICROTOKENS_PER_TOKEN);
        assert_eq!(gs.total_collectibles, 1);
        let (base, variance) = Rarity::Common.boost_range();
        for boost in [minted.speed_boost, minted.reward_boost, minted.experience_boost] {
            assert!(boost >= base && boost < base + variance);
        }

        let err = create_collectible(
            &mut gs,
            &mut player,
            Rarity::Legendary,
            ItemClass::Sneaker,
            b"seed",
        )
        .unwrap_err();
        assert_eq!(err, FixierunError::InsufficientBalance.into());
        assert_eq!(player.collectibles.len(), 1);
        assert_eq!(gs.burned_tokens, 10 * MICROTOKENS_PER_TOKEN);
    }

    #[test]
    fn collectible_ids_are_unique_and_capacity_is_enforced() {
        let mut gs = test_global_state();
        let mut player = test_player();
        player.balance = u64::MAX;

        for _ in 0..MAX_COLLECTIBLES_PER_PLAYER {
            create_collectible(&mut gs, &mut player, Rarity::Common, ItemClass::Sneaker, b"s")
                .unwrap();
        }
        let err =
            create_collectible(&mut gs, &mut player, Rarity::Common, ItemClass::Sneaker, b"s")
                .unwrap_err();
        assert_eq!(err, FixierunError::CollectibleLimitReached.into());

        let mut ids: Vec<u64> = player.collectibles.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), MAX_COLLECTIBLES_PER_PLAYER);
    }

    #[test]
    fn roster_membership_is_strict() {
        let mut gs = test_global_state();
        let validator = Pubkey::new_unique();

        GlobalState::add_to_roster(&mut gs.validators, validator).unwrap();
        assert!(gs.is_validator(&validator));
        assert!(!gs.is_minter(&validator));

        let err = GlobalState::add_to_roster(&mut gs.validators, validator).unwrap_err();
        assert_eq!(err, FixierunError::AlreadyRegistered.into());

        GlobalState::remove_from_roster(&mut gs.validators, &validator).unwrap();
        assert!(!gs.is_validator(&validator));
        let err = GlobalState::remove_from_roster(&mut gs.validators, &validator).unwrap_err();
        assert_eq!(err, FixierunError::NotRegistered.into());
    }

    #[test]
    fn roster_capacity_is_bounded() {
        let mut gs = test_global_state();
        for _ in 0..MAX_ROSTER_SIZE {
            GlobalState::add_to_roster(&mut gs.minters, Pubkey::new_unique()).unwrap();
        }
        let err = GlobalState::add_to_roster(&mut gs.minters, Pubkey::new_unique()).unwrap_err();
        assert_eq!(err, FixierunError::RosterFull.into());
    }

    #[test]
    fn stake_flags_toggle_with_state_checks() {
        let mut player = test_player();
        player.collectibles.push(collectible_with_reward_boost(1, 5));

        let c = player.collectible_mut(1).unwrap();
        assert!(!c.staked);
        c.staked = true;
        c.staked_at = 1_700_000_000;

        let c = player.collectible(1).unwrap();
        assert!(c.staked);
        assert_eq!(c.staked_at, 1_700_000_000);
        assert!(player.collectible(2).is_none());
    }

    fn fresh_receipt() -> WorkoutReceipt {
        WorkoutReceipt {
            fingerprint: [0u8; 32],
            owner: Pubkey::default(),
            day: 0,
            tokens_earned: 0,
            processed: false,
        }
    }

    #[test]
    fn duplicate_submission_is_rejected() {
        let gs = test_global_state();
        let owner = Pubkey::new_unique();
        let w = workout(5_000, ActivityKind::Running);
        let fingerprint = workout_fingerprint(&owner, &w);
        let now = w.timestamp + 60;

        let mut receipt = fresh_receipt();
        admit_workout(&gs, &receipt, &owner, &w, fingerprint, now).unwrap();

        // the first acceptance commits the marker; the identical record is
        // rejected from then on
        receipt.processed = true;
        let err = admit_workout(&gs, &receipt, &owner, &w, fingerprint, now).unwrap_err();
        assert_eq!(err, FixierunError::DuplicateWorkout.into());
    }

    #[test]
    fn stale_and_future_workouts_are_rejected() {
        let gs = test_global_state();
        let owner = Pubkey::new_unique();
        let w = workout(5_000, ActivityKind::Running);
        let fingerprint = workout_fingerprint(&owner, &w);
        let receipt = fresh_receipt();

        // exactly at the window edge is still fresh
        let edge = w.timestamp + gs.freshness_window_seconds;
        admit_workout(&gs, &receipt, &owner, &w, fingerprint, edge).unwrap();

        let err = admit_workout(&gs, &receipt, &owner, &w, fingerprint, edge + 1).unwrap_err();
        assert_eq!(err, FixierunError::StaleWorkout.into());

        let err =
            admit_workout(&gs, &receipt, &owner, &w, fingerprint, w.timestamp - 1).unwrap_err();
        assert_eq!(err, FixierunError::InvalidTimestamp.into());
    }

    #[test]
    fn tampered_record_fails_fingerprint_check() {
        let gs = test_global_state();
        let owner = Pubkey::new_unique();
        let w = workout(5_000, ActivityKind::Running);
        let fingerprint = workout_fingerprint(&owner, &w);
        let receipt = fresh_receipt();

        let mut tampered = w.clone();
        tampered.distance_meters = 50_000;
        let err = admit_workout(
            &gs,
            &receipt,
            &owner,
            &tampered,
            fingerprint,
            w.timestamp + 60,
        )
        .unwrap_err();
        assert_eq!(err, FixierunError::FingerprintMismatch.into());
    }

    #[test]
    fn repeated_equipment_id_cannot_stack_boosts() {
        let mut gs = test_global_state();
        let mut player = test_player();
        player.collectibles.push(collectible_with_reward_boost(1, 10));

        let mut w = workout(5_000, ActivityKind::Running);
        w.equipped_collectibles = vec![1, 1];

        let err = process_workout(&mut gs, &mut player, &w, 100).unwrap_err();
        assert_eq!(err, FixierunError::DuplicateEquipment.into());
        assert_eq!(player.balance, 0);
        assert_eq!(gs.total_issued, 0);
        assert_eq!(player.collectibles[0].experience, 0);
    }

    #[test]
    fn kill_switch_gates_mutations() {
        let mut gs = test_global_state();
        ensure_production(&gs).unwrap();

        gs.production_enabled = false;
        let err = ensure_production(&gs).unwrap_err();
        assert_eq!(err, FixierunError::ProductionDisabled.into());
    }
}
