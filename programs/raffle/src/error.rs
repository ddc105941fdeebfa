use anchor_lang::error_code;

#[error_code]
pub enum RaffleError {
    Overflow,
    InvalidEntranceFee,
    InvalidInterval,
    #[msg("Not enough lamports sent to cover the entrance fee")]
    InsufficientEntranceFee,
    #[msg("The raffle is not open")]
    RaffleNotOpen,
    #[msg("The player list for this round is full")]
    RaffleFull,
    #[msg("Upkeep is not needed")]
    UpkeepNotNeeded,
    #[msg("No randomness request with this id is outstanding")]
    RequestNotFound,
    #[msg("Fulfillment must be signed by the coordinator identity")]
    InvalidOracleIdentity,
    #[msg("Winner account missing from the fulfillment accounts")]
    InvalidWinnerAccount,
    #[msg("The coordinator account is not executable")]
    InvalidCoordinator,
    #[msg("The subscription account is not owned by the coordinator")]
    InvalidSubscription,
    #[msg("Vault transfer failed")]
    TransferFailed,
    #[msg("Failed to compile the upkeep transaction for scheduling")]
    CompileTransactionFailed,
    #[msg("The trigger timestamp is earlier than the next due upkeep")]
    TriggerTooEarly,
}
