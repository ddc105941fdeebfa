use anchor_lang::prelude::*;
use instructions::*;

pub mod constants;
pub mod error;
pub mod instructions;
pub mod oracle;
pub mod state;

declare_id!("Lottery111111111111111111111111111111111111");

#[program]
pub mod raffle {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>, entrance_fee: u64, interval: i64) -> Result<()> {
        instructions::initialize::initialize(ctx, entrance_fee, interval)
    }

    pub fn enter_raffle(ctx: Context<EnterRaffle>, amount: u64) -> Result<()> {
        instructions::enter_raffle::enter_raffle(ctx, amount)
    }

    pub fn check_upkeep(ctx: Context<CheckUpkeep>) -> Result<bool> {
        instructions::check_upkeep::check_upkeep(ctx)
    }

    pub fn perform_upkeep(ctx: Context<PerformUpkeep>) -> Result<()> {
        instructions::perform_upkeep::perform_upkeep(ctx)
    }

    pub fn fulfill_randomness(
        ctx: Context<FulfillRandomness>,
        request_id: u64,
        randomness: [u8; 32],
    ) -> Result<()> {
        instructions::fulfill_randomness::fulfill_randomness(ctx, request_id, randomness)
    }

    pub fn schedule_upkeep(
        ctx: Context<ScheduleUpkeep>,
        task_id: u16,
        trigger_timestamp: i64,
    ) -> Result<()> {
        instructions::schedule_upkeep::schedule_upkeep(ctx, task_id, trigger_timestamp)
    }
}
