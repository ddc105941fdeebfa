use anchor_lang::prelude::*;
use anchor_lang::solana_program::{hash::hashv, program::invoke};
use anchor_lang::Discriminator;

use crate::{
    error::RaffleError,
    oracle::{self, CallbackAccountMeta},
    state::{Raffle, RaffleState, Vault},
};

/// Event emitted when a randomness request is sent to the coordinator
#[event]
pub struct WinnerRequested {
    /// The pubkey of the raffle
    pub raffle: Pubkey,
    /// Identifier of the randomness request
    pub request_id: u64,
}

/// Locks the raffle and requests randomness from the coordinator.
///
/// No signer is required. The automation network cranks this instruction
/// once `check_upkeep` reports true; the predicate is re-validated here so
/// a crank cannot force a draw early.
///
/// Execution requirements:
/// 1. The raffle must be in Open state
/// 2. More than `interval` seconds must have passed since the last round
/// 3. At least one player must have entered and the pot must be non-empty
///
/// After execution:
/// - The raffle state is Calculating and entries are rejected
/// - A randomness request naming the fulfillment callback and its account
///   list is registered with the coordinator, funded by the subscription
///
/// # Errors
/// - `UpkeepNotNeeded` if any predicate condition fails
/// - `InvalidCoordinator` / `InvalidSubscription` on mismatched oracle wiring
pub fn perform_upkeep(ctx: Context<PerformUpkeep>) -> Result<()> {
    let clock = Clock::get()?;
    let raffle = &mut ctx.accounts.raffle;

    if !raffle.upkeep_needed(clock.unix_timestamp) {
        msg!(
            "Upkeep not needed: pot={}, players={}, state={}",
            raffle.pot_amount,
            raffle.players.len(),
            raffle.raffle_state as u8
        );
        return Err(RaffleError::UpkeepNotNeeded.into());
    }

    raffle.raffle_state = RaffleState::Calculating;
    raffle.request_nonce = raffle
        .request_nonce
        .checked_add(1)
        .ok_or(RaffleError::Overflow)?;
    raffle.pending_request = raffle.request_nonce;

    // The request seed binds this raffle, the request id and the current time
    let seed = hashv(&[
        raffle.key().as_ref(),
        &raffle.request_nonce.to_le_bytes(),
        &clock.unix_timestamp.to_le_bytes(),
    ])
    .to_bytes();

    // The fulfillment needs the raffle, the vault, and every recorded player
    // so the winner can be paid inside the callback
    let mut callback_accounts = vec![
        CallbackAccountMeta {
            pubkey: raffle.key(),
            is_writable: true,
        },
        CallbackAccountMeta {
            pubkey: ctx.accounts.vault.key(),
            is_writable: true,
        },
    ];
    for player in raffle.players.iter() {
        callback_accounts.push(CallbackAccountMeta {
            pubkey: *player,
            is_writable: true,
        });
    }

    let callback_discriminator: [u8; 8] = crate::instruction::FulfillRandomness::DISCRIMINATOR
        .try_into()
        .expect("discriminator must be 8 bytes");

    let ix = oracle::request_randomness_ix(
        ctx.accounts.coordinator.key(),
        ctx.accounts.subscription.key(),
        seed,
        crate::ID,
        callback_discriminator,
        &callback_accounts,
    );

    invoke(
        &ix,
        &[
            ctx.accounts.subscription.to_account_info(),
            ctx.accounts.coordinator.to_account_info(),
        ],
    )?;

    msg!("Requested randomness, request id {}", raffle.pending_request);

    // Emit the request event
    emit!(WinnerRequested {
        raffle: raffle.key(),
        request_id: raffle.pending_request,
    });

    Ok(())
}

/// Accounts required for the perform_upkeep instruction
#[derive(Accounts)]
pub struct PerformUpkeep<'info> {
    #[account(
        mut,
        seeds = [b"raffle"],
        bump = raffle.bump,
    )]
    pub raffle: Account<'info, Raffle>,

    /// Vault holding the pot that will be paid out on fulfillment
    #[account(seeds = [b"vault"], bump = vault.bump)]
    pub vault: Account<'info, Vault>,

    /// The randomness coordinator program
    /// CHECK: Must match the coordinator configured at initialization.
    #[account(
        executable,
        address = raffle.coordinator @ RaffleError::InvalidCoordinator,
    )]
    pub coordinator: UncheckedAccount<'info>,

    /// The coordinator subscription funding this request
    /// CHECK: Must match the subscription configured at initialization.
    #[account(
        mut,
        address = raffle.subscription @ RaffleError::InvalidSubscription,
    )]
    pub subscription: UncheckedAccount<'info>,
}
