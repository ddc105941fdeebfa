use anchor_lang::prelude::*;

use crate::state::Raffle;

/// Evaluates the upkeep predicate without changing any state.
///
/// The automation network simulates this instruction to decide whether to
/// execute `perform_upkeep`. The predicate holds when all of these are true:
/// 1. The raffle is in Open state
/// 2. More than `interval` seconds passed since the last round ended
/// 3. At least one player entered
/// 4. The pot holds lamports to pay out
pub fn check_upkeep(ctx: Context<CheckUpkeep>) -> Result<bool> {
    let raffle = &ctx.accounts.raffle;
    let now = Clock::get()?.unix_timestamp;
    let upkeep_needed = raffle.upkeep_needed(now);

    msg!(
        "Upkeep check: state={}, elapsed={}, players={}, pot={}",
        raffle.raffle_state as u8,
        now.saturating_sub(raffle.last_timestamp),
        raffle.players.len(),
        raffle.pot_amount
    );

    Ok(upkeep_needed)
}

/// Accounts required for the check_upkeep instruction
#[derive(Accounts)]
pub struct CheckUpkeep<'info> {
    #[account(seeds = [b"raffle"], bump = raffle.bump)]
    pub raffle: Account<'info, Raffle>,
}
