/// Upper bound on recorded players per round. The full player list rides
/// along with the randomness request so the fulfillment can pay the winner
/// in one instruction, which caps how many entries a round can hold.
pub const MAX_PLAYERS: usize = 32;

/// Default entrance fee in lamports (0.01 SOL), used by local harnesses.
pub const DEFAULT_ENTRANCE_FEE: u64 = 10_000_000;

/// Default upkeep interval in seconds, used by local harnesses.
pub const DEFAULT_UPKEEP_INTERVAL: i64 = 30;

/// Lamports a freshly created subscription is funded with on development
/// clusters.
pub const DEV_SUBSCRIPTION_FUNDING: u64 = 2_000_000_000;
