use anchor_lang::prelude::*;

use crate::{
    error::RaffleError,
    state::{winner_index, Raffle, RaffleState, Vault},
};

/// Event emitted when the coordinator delivers randomness and a winner is paid
#[event]
pub struct WinnerPicked {
    /// The pubkey of the raffle
    pub raffle: Pubkey,
    /// The winning player
    pub winner: Pubkey,
    /// Prize paid out in lamports
    pub prize: u64,
    /// The randomness request this fulfillment answers
    pub request_id: u64,
}

/// Coordinator callback delivering the requested randomness.
///
/// The winner is selected from the recorded players, paid the entire pot,
/// and the raffle is reset for the next round in the same instruction.
///
/// # Security Considerations
/// The instruction performs several critical checks:
/// 1. The signer must be the coordinator identity derived at initialization
/// 2. A request with the given id must be outstanding
/// 3. The winner account must be present among the passed player accounts
/// 4. The payout equals the tracked pot, never the vault's rent reserve
///
/// # Account Validations
/// * OracleIdentity - Signer, compared against the stored identity PDA
/// * Raffle - Must hold the pending request being answered
/// * Vault - Holds the pot; lamports move directly since it is program-owned
/// * Remaining accounts - The recorded players, fixed at request time
pub fn fulfill_randomness(
    ctx: Context<FulfillRandomness>,
    request_id: u64,
    randomness: [u8; 32],
) -> Result<()> {
    let raffle = &mut ctx.accounts.raffle;

    require_keys_eq!(
        ctx.accounts.oracle_identity.key(),
        raffle.oracle_identity,
        RaffleError::InvalidOracleIdentity
    );

    require!(
        raffle.raffle_state == RaffleState::Calculating
            && raffle.pending_request != 0
            && raffle.pending_request == request_id,
        RaffleError::RequestNotFound
    );

    let index = winner_index(&randomness, raffle.players.len() as u64)?;
    let winner = raffle.players[index as usize];

    // Locate the winner among the accounts fixed at request time
    let winner_account = ctx
        .remaining_accounts
        .iter()
        .find(|info| info.key() == winner)
        .ok_or(RaffleError::InvalidWinnerAccount)?;

    let prize = raffle.pot_amount;

    // Transfer lamports by directly deducting from the vault and adding to
    // the winner. This only works because the vault is a PDA owned by our
    // program.
    let vault_account = ctx.accounts.vault.to_account_info();
    vault_account.sub_lamports(prize)?;
    winner_account.add_lamports(prize)?;

    // Reset the round
    let clock = Clock::get()?;
    raffle.players.clear();
    raffle.pot_amount = 0;
    raffle.pending_request = 0;
    raffle.recent_winner = Some(winner);
    raffle.raffle_state = RaffleState::Open;
    raffle.last_timestamp = clock.unix_timestamp;

    msg!("Winner picked: {} (request {})", winner, request_id);

    // Emit the winner picked event
    emit!(WinnerPicked {
        raffle: raffle.key(),
        winner,
        prize,
        request_id,
    });

    Ok(())
}

/// Accounts required for the fulfill_randomness instruction
#[derive(Accounts)]
pub struct FulfillRandomness<'info> {
    /// The coordinator identity signing this fulfillment
    /// CHECK: Compared against the identity stored at initialization.
    pub oracle_identity: Signer<'info>,

    #[account(
        mut,
        seeds = [b"raffle"],
        bump = raffle.bump,
    )]
    pub raffle: Account<'info, Raffle>,

    #[account(
        mut,
        seeds = [b"vault"],
        bump = vault.bump,
    )]
    pub vault: Account<'info, Vault>,
}
