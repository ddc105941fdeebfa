use anchor_lang::prelude::*;

use crate::{
    error::RaffleError,
    oracle,
    state::{Raffle, RaffleState, Vault, RAFFLE_ACCOUNT_SIZE, VAULT_ACCOUNT_SIZE},
};

/// Event emitted when the raffle is initialized
#[event]
pub struct RaffleInitialized {
    /// The pubkey of the raffle
    pub raffle: Pubkey,
    /// Entrance fee in lamports
    pub entrance_fee: u64,
    /// Upkeep interval in seconds
    pub interval: i64,
    /// The randomness coordinator program
    pub coordinator: Pubkey,
}

/// Instruction to initialize the raffle
/// This should be called once during deployment
///
/// # Security Considerations
/// - Creates PDAs with seeds "raffle" and "vault", so only one instance can exist
/// - The coordinator program and a funded subscription must be provisioned
///   on the target cluster beforehand
/// - The fulfillment identity is derived from the coordinator here and never
///   changes afterwards
///
/// # Account Validations
/// * Raffle - New PDA initialized with proper space allocation
/// * Vault - New PDA that holds the pooled entrance fees
/// * Coordinator - Must be an executable program account
/// * Subscription - Must be owned by the coordinator
pub fn initialize(ctx: Context<Initialize>, entrance_fee: u64, interval: i64) -> Result<()> {
    require!(entrance_fee > 0, RaffleError::InvalidEntranceFee);
    require!(interval > 0, RaffleError::InvalidInterval);

    let clock = Clock::get()?;
    let coordinator = ctx.accounts.coordinator.key();

    let raffle = &mut ctx.accounts.raffle;
    raffle.bump = ctx.bumps.raffle;
    raffle.authority = ctx.accounts.authority.key();
    raffle.coordinator = coordinator;
    raffle.subscription = ctx.accounts.subscription.key();
    raffle.oracle_identity = oracle::identity_pda(&coordinator);
    raffle.entrance_fee = entrance_fee;
    raffle.interval = interval;
    raffle.last_timestamp = clock.unix_timestamp;
    raffle.raffle_state = RaffleState::Open;
    raffle.players = Vec::new();
    raffle.recent_winner = None;
    raffle.pot_amount = 0;
    raffle.request_nonce = 0;
    raffle.pending_request = 0;

    ctx.accounts.vault.bump = ctx.bumps.vault;

    emit!(RaffleInitialized {
        raffle: ctx.accounts.raffle.key(),
        entrance_fee,
        interval,
        coordinator,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(
        init,
        payer = authority,
        space = RAFFLE_ACCOUNT_SIZE,
        seeds = [b"raffle"],
        bump
    )]
    pub raffle: Account<'info, Raffle>,

    #[account(
        init,
        payer = authority,
        space = VAULT_ACCOUNT_SIZE,
        seeds = [b"vault"],
        bump,
    )]
    pub vault: Account<'info, Vault>,

    #[account(mut)]
    pub authority: Signer<'info>,

    /// The randomness coordinator program
    /// CHECK: Only the program id is stored; it must be executable.
    #[account(constraint = coordinator.executable @ RaffleError::InvalidCoordinator)]
    pub coordinator: UncheckedAccount<'info>,

    /// Funded coordinator subscription that pays for randomness requests
    /// CHECK: Ownership by the coordinator is the structural requirement.
    #[account(
        constraint = subscription.owner == coordinator.key @ RaffleError::InvalidSubscription,
    )]
    pub subscription: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}
