use anchor_lang::prelude::*;

use crate::{
    error::RaffleError,
    state::{Raffle, RaffleState, Vault},
};

/// Event emitted when a player enters the raffle
#[event]
pub struct RaffleEntered {
    /// The pubkey of the raffle
    pub raffle: Pubkey,
    /// The entering player
    pub player: Pubkey,
    /// Amount paid in lamports
    pub amount: u64,
    /// Index of the player in the current round
    pub player_index: u64,
}

/// Instruction to enter the current raffle round
///
/// # Arguments
/// * `ctx` - The context object containing all required accounts
/// * `amount` - Lamports the player pays; must cover the entrance fee
///
/// # Security Considerations
/// The instruction performs several critical checks:
/// 1. Validates the raffle is in Open state through account constraints
/// 2. Validates the payment covers the configured entrance fee
/// 3. Rejects entries once the round's player list is full
/// 4. Uses checked arithmetic for the pot accounting
/// 5. Verifies the vault balance actually grew by the payment
///
/// # Account Validations
/// * Raffle - Must be in Open state
/// * Vault - PDA with seeds ["vault"], receives the payment
/// * Player - Must sign and have sufficient funds for the transfer
pub fn enter_raffle(ctx: Context<EnterRaffle>, amount: u64) -> Result<()> {
    require!(
        amount >= ctx.accounts.raffle.entrance_fee,
        RaffleError::InsufficientEntranceFee
    );
    require!(!ctx.accounts.raffle.is_full(), RaffleError::RaffleFull);

    // Store pre-transfer balance for verification
    let pre_transfer_balance = ctx.accounts.vault.to_account_info().lamports();

    // Transfer lamports from the player to the vault
    anchor_lang::solana_program::program::invoke(
        &anchor_lang::solana_program::system_instruction::transfer(
            &ctx.accounts.player.key(),
            &ctx.accounts.vault.key(),
            amount,
        ),
        &[
            ctx.accounts.player.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
            ctx.accounts.vault.to_account_info(),
        ],
    )?;

    // Verify the transfer was successful by checking the vault balance
    let post_transfer_balance = ctx.accounts.vault.to_account_info().lamports();
    require!(
        post_transfer_balance
            == pre_transfer_balance
                .checked_add(amount)
                .ok_or(RaffleError::Overflow)?,
        RaffleError::TransferFailed
    );

    let raffle = &mut ctx.accounts.raffle;
    let player_index = raffle.players.len() as u64;
    raffle.players.push(ctx.accounts.player.key());
    raffle.pot_amount = raffle
        .pot_amount
        .checked_add(amount)
        .ok_or(RaffleError::Overflow)?;

    // Emit the raffle entered event
    emit!(RaffleEntered {
        raffle: raffle.key(),
        player: ctx.accounts.player.key(),
        amount,
        player_index,
    });

    Ok(())
}

/// Accounts required for the enter_raffle instruction
#[derive(Accounts)]
pub struct EnterRaffle<'info> {
    /// The raffle being entered
    /// Must be in Open state
    #[account(
        mut,
        seeds = [b"raffle"],
        bump = raffle.bump,
        constraint = raffle.raffle_state == RaffleState::Open @ RaffleError::RaffleNotOpen,
    )]
    pub raffle: Account<'info, Raffle>,

    /// Vault that receives the entrance fee
    #[account(
        mut,
        seeds = [b"vault"],
        bump = vault.bump,
    )]
    pub vault: Account<'info, Vault>,

    /// The player entering the raffle
    #[account(mut)]
    pub player: Signer<'info>,

    pub system_program: Program<'info, System>,
}
