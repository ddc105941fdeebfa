use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::{prelude::*, InstructionData, ToAccountMetas};
use tuktuk_program::{
    compile_transaction,
    tuktuk::{
        cpi::{accounts::QueueTaskV0, queue_task_v0},
        program::Tuktuk,
        types::TriggerV0,
    },
    types::QueueTaskArgsV0,
    TransactionSourceV0,
};

use crate::{
    error::RaffleError,
    state::{Raffle, Vault},
};

/// Builds the `perform_upkeep` instruction the automation network will
/// execute. None of its accounts signs, so the task can run unattended.
pub fn perform_upkeep_instruction(
    raffle: Pubkey,
    vault: Pubkey,
    coordinator: Pubkey,
    subscription: Pubkey,
) -> Instruction {
    Instruction {
        program_id: crate::ID,
        accounts: crate::accounts::PerformUpkeep {
            raffle,
            vault,
            coordinator,
            subscription,
        }
        .to_account_metas(None),
        data: crate::instruction::PerformUpkeep {}.data(),
    }
}

/// Registers the next upkeep run with the TukTuk automation network.
///
/// The queued task fires at `trigger_timestamp` and executes
/// `perform_upkeep`, which re-validates the upkeep predicate on its own.
/// Scheduling earlier than one full interval after the last round ended is
/// rejected.
pub fn schedule_upkeep(
    ctx: Context<ScheduleUpkeep>,
    task_id: u16,
    trigger_timestamp: i64,
) -> Result<()> {
    let raffle = &ctx.accounts.raffle;

    let due = raffle
        .last_timestamp
        .checked_add(raffle.interval)
        .ok_or(RaffleError::Overflow)?;
    require!(trigger_timestamp >= due, RaffleError::TriggerTooEarly);

    let upkeep_ix = perform_upkeep_instruction(
        raffle.key(),
        ctx.accounts.vault.key(),
        raffle.coordinator,
        raffle.subscription,
    );

    // Compile to TukTuk's transaction format
    let (compiled_tx, _) = compile_transaction(vec![upkeep_ix], vec![])
        .map_err(|_| error!(RaffleError::CompileTransactionFailed))?;

    // CPI into TukTuk to register the task
    let signer_seeds: &[&[&[u8]]] = &[&[b"queue_authority", &[ctx.bumps.queue_authority]]];

    let cpi_accounts = QueueTaskV0 {
        payer: ctx.accounts.authority.to_account_info(),
        queue_authority: ctx.accounts.queue_authority.to_account_info(),
        task_queue: ctx.accounts.task_queue.to_account_info(),
        task_queue_authority: ctx.accounts.task_queue_authority.to_account_info(),
        task: ctx.accounts.task.to_account_info(),
        system_program: ctx.accounts.system_program.to_account_info(),
    };

    let cpi_ctx = CpiContext::new_with_signer(
        ctx.accounts.tuktuk_program.to_account_info(),
        cpi_accounts,
        signer_seeds,
    );

    queue_task_v0(
        cpi_ctx,
        QueueTaskArgsV0 {
            trigger: TriggerV0::Timestamp(trigger_timestamp),
            transaction: TransactionSourceV0::CompiledV0(compiled_tx),
            crank_reward: Some(1_000_001),
            free_tasks: 1,
            id: task_id,
            description: format!("raffle-upkeep-{}", task_id),
        },
    )?;

    msg!("Scheduled upkeep at timestamp {}", trigger_timestamp);

    Ok(())
}

/// Accounts required for the schedule_upkeep instruction
#[derive(Accounts)]
#[instruction(task_id: u16, trigger_timestamp: i64)]
pub struct ScheduleUpkeep<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        seeds = [b"raffle"],
        bump = raffle.bump,
        has_one = authority,
    )]
    pub raffle: Account<'info, Raffle>,

    #[account(seeds = [b"vault"], bump = vault.bump)]
    pub vault: Account<'info, Vault>,

    /// CHECK: TukTuk task queue (pre-created off-chain)
    #[account(mut)]
    pub task_queue: UncheckedAccount<'info>,

    /// CHECK: TukTuk task queue authority PDA
    pub task_queue_authority: UncheckedAccount<'info>,

    /// CHECK: TukTuk task account (initialized by CPI)
    #[account(mut)]
    pub task: UncheckedAccount<'info>,

    /// CHECK: Our program's PDA that signs the TukTuk CPI
    #[account(
        mut,
        seeds = [b"queue_authority"],
        bump,
    )]
    pub queue_authority: AccountInfo<'info>,

    pub system_program: Program<'info, System>,
    pub tuktuk_program: Program<'info, Tuktuk>,
}
