use anchor_lang::prelude::*;

#[error_code]
pub enum FixierunError {
    #[msg("Unauthorized access")]
    Unauthorized,
    #[msg("Production is disabled")]
    ProductionDisabled,
    #[msg("Workout already processed")]
    DuplicateWorkout,
    #[msg("Workout too old")]
    StaleWorkout,
    #[msg("Workout timestamp is in the future")]
    InvalidTimestamp,
    #[msg("Submitted fingerprint does not match the workout record")]
    FingerprintMismatch,
    #[msg("Equipped collectible is not owned by the athlete")]
    CollectibleNotOwned,
    #[msg("Collectible equipped more than once")]
    DuplicateEquipment,
    #[msg("Collectible does not exist")]
    CollectibleNotFound,
    #[msg("Caller is not the collectible owner")]
    NotOwner,
    #[msg("Collectible is already staked")]
    AlreadyStaked,
    #[msg("Collectible is not staked")]
    NotStaked,
    #[msg("Insufficient $FIXIE balance")]
    InsufficientBalance,
    #[msg("Would exceed max supply")]
    SupplyExceeded,
    #[msg("Daily emission limit exceeded")]
    DailyEmissionExceeded,
    #[msg("Collectible capacity reached for this player")]
    CollectibleLimitReached,
    #[msg("Roster is full")]
    RosterFull,
    #[msg("Principal is already on the roster")]
    AlreadyRegistered,
    #[msg("Principal is not on the roster")]
    NotRegistered,
    #[msg("No rewards to claim")]
    NothingToClaim,
    #[msg("Invalid parameter value")]
    InvalidParameter,
    #[msg("Invalid token mint")]
    InvalidTokenMint,
}
