use anchor_lang::prelude::*;
use arrayref::array_ref;

use crate::constants::MAX_PLAYERS;
use crate::error::RaffleError;

// Space calculation:
// 8 (discriminator) +
// 1 (bump) +
// 32 (authority) +
// 32 (coordinator) +
// 32 (subscription) +
// 32 (oracle_identity) +
// 8 (entrance_fee) +
// 8 (interval) +
// 8 (last_timestamp) +
// 1 (raffle_state) +
// 4 + 32 * MAX_PLAYERS (players) +
// 33 (recent_winner: Option<Pubkey>) +
// 8 (pot_amount) +
// 8 (request_nonce) +
// 8 (pending_request) =
// 1247 total bytes with MAX_PLAYERS = 32
pub const RAFFLE_ACCOUNT_SIZE: usize =
    8 + 1 + 32 + 32 + 32 + 32 + 8 + 8 + 8 + 1 + (4 + 32 * MAX_PLAYERS) + 33 + 8 + 8 + 8;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum RaffleState {
    Open = 0,
    Calculating = 1,
}

#[account]
pub struct Raffle {
    pub bump: u8,
    pub authority: Pubkey,
    /// Program id of the randomness coordinator.
    pub coordinator: Pubkey,
    /// Coordinator-owned account that funds randomness requests.
    pub subscription: Pubkey,
    /// Identity PDA the coordinator signs fulfillments with.
    pub oracle_identity: Pubkey,
    pub entrance_fee: u64,
    pub interval: i64,
    pub last_timestamp: i64,
    pub raffle_state: RaffleState,
    pub players: Vec<Pubkey>,
    pub recent_winner: Option<Pubkey>,
    pub pot_amount: u64,
    pub request_nonce: u64,
    pub pending_request: u64,
}

impl Raffle {
    pub fn is_open(&self) -> bool {
        self.raffle_state == RaffleState::Open
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    /// The upkeep predicate. Holds when the raffle is open, more than
    /// `interval` seconds passed since the last round ended, at least one
    /// player entered, and the pot holds lamports to pay out.
    pub fn upkeep_needed(&self, now: i64) -> bool {
        let time_passed = now.saturating_sub(self.last_timestamp) > self.interval;
        self.is_open() && time_passed && !self.players.is_empty() && self.pot_amount > 0
    }
}

/// Maps the coordinator's 32-byte output to a player index.
///
/// Two 8-byte windows of the output are combined through cryptographic
/// mixing and the result is reduced into `[0, player_count)` without
/// statistical bias.
pub fn winner_index(randomness: &[u8; 32], player_count: u64) -> Result<u64> {
    let chunk1 = array_ref![randomness, 0, 8];
    let chunk2 = array_ref![randomness, 8, 8];

    let mixed = mix(u64::from_le_bytes(*chunk1), u64::from_le_bytes(*chunk2));

    unbiased_range(mixed, player_count)
}

/// Cryptographic mixing function with strong avalanche properties
/// Each bit in the output has a ~50% chance of flipping when any input bit changes.
/// Based on splitmix64 algorithm used in high-quality PRNGs.
fn mix(a: u64, b: u64) -> u64 {
    let mut z = a.wrapping_add(b);

    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z = z ^ (z >> 31);

    z
}

/// Maps a random number to a range without introducing statistical bias
/// Standard modulo operations can bias results when the range isn't a power of 2.
fn unbiased_range(x: u64, range: u64) -> Result<u64> {
    if range == 0 {
        return Err(RaffleError::Overflow.into());
    }

    // If range is a power of 2, we can use a simple mask which is unbiased
    if range.is_power_of_two() {
        return Ok(x & (range - 1));
    }

    // For small ranges, simple modulo is fine as bias is minimal
    if range <= 256 {
        return Ok(x % range);
    }

    // Find threshold value to ensure unbiased selection
    let threshold = u64::MAX - (u64::MAX % range);

    // Use rejection sampling with a limit on computational cost
    let mut value = x;

    const MAX_ATTEMPTS: u8 = 3;

    for i in 0..MAX_ATTEMPTS {
        // If value is below threshold, we can use modulo safely
        if value < threshold {
            return Ok(value % range);
        }

        // Try a new value with additional mixing
        value = mix(value, value.wrapping_add(i as u64 + 1));
    }

    // Fallback case - the bias is minimal after the mixing operations
    Ok(value % range)
}
