use anchor_lang::prelude::*;

// 8 discriminator, 1 bump
pub const VAULT_ACCOUNT_SIZE: usize = 8 + 1;

#[account]
pub struct Vault {
    pub bump: u8,
}
