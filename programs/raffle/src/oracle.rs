use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    hash::hash as sha256,
    instruction::{AccountMeta, Instruction},
};

pub const IDENTITY_SEED: &[u8] = b"identity";

/// Compute an Anchor instruction discriminator: sha256("global:<name>")[..8]
pub fn sighash(name: &str) -> [u8; 8] {
    let preimage = format!("global:{}", name);
    let hash = sha256(preimage.as_bytes());
    let mut disc = [0u8; 8];
    disc.copy_from_slice(&hash.to_bytes()[..8]);
    disc
}

/// The identity PDA the coordinator signs fulfillments with.
pub fn identity_pda(coordinator: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[IDENTITY_SEED], coordinator).0
}

/// Account a fulfillment will be invoked with, fixed at request time.
pub struct CallbackAccountMeta {
    pub pubkey: Pubkey,
    pub is_writable: bool,
}

/// Build the coordinator's `create_subscription` instruction.
/// The subscription account signs its own creation.
pub fn create_subscription_ix(
    coordinator: Pubkey,
    payer: Pubkey,
    subscription: Pubkey,
) -> Instruction {
    Instruction {
        program_id: coordinator,
        accounts: vec![
            AccountMeta::new(payer, true),
            AccountMeta::new(subscription, true),
            AccountMeta::new_readonly(anchor_lang::system_program::ID, false),
        ],
        data: sighash("create_subscription").to_vec(),
    }
}

/// Build the coordinator's `fund_subscription` instruction.
pub fn fund_subscription_ix(
    coordinator: Pubkey,
    payer: Pubkey,
    subscription: Pubkey,
    amount: u64,
) -> Instruction {
    let mut data = sighash("fund_subscription").to_vec();
    data.extend_from_slice(&amount.to_le_bytes());

    Instruction {
        program_id: coordinator,
        accounts: vec![
            AccountMeta::new(payer, true),
            AccountMeta::new(subscription, false),
            AccountMeta::new_readonly(anchor_lang::system_program::ID, false),
        ],
        data,
    }
}

/// Build the coordinator's `request_randomness` instruction.
///
/// Borsh layout: 32-byte seed, callback program id, 8-byte callback
/// discriminator, then the account list the fulfillment will be invoked
/// with. The coordinator prepends its identity PDA as a signer when it
/// executes the callback.
pub fn request_randomness_ix(
    coordinator: Pubkey,
    subscription: Pubkey,
    seed: [u8; 32],
    callback_program_id: Pubkey,
    callback_discriminator: [u8; 8],
    callback_accounts: &[CallbackAccountMeta],
) -> Instruction {
    let mut data = sighash("request_randomness").to_vec();
    data.extend_from_slice(&seed);
    data.extend_from_slice(&callback_program_id.to_bytes());
    data.extend_from_slice(&callback_discriminator);
    data.extend_from_slice(&(callback_accounts.len() as u32).to_le_bytes());
    for meta in callback_accounts {
        data.extend_from_slice(&meta.pubkey.to_bytes());
        data.push(meta.is_writable as u8);
    }

    Instruction {
        program_id: coordinator,
        accounts: vec![AccountMeta::new(subscription, false)],
        data,
    }
}
