//! Shared harness for the local raffle suite.
//!
//! Registers the raffle program and a native mock of the randomness
//! coordinator, then performs the provisioning steps a deployment runs on a
//! development cluster: create a subscription on the mock coordinator, fund
//! it, and initialize the raffle against it. Live clusters use a
//! pre-provisioned coordinator and subscription instead, exercised by the
//! staging suite.

use {
    anchor_lang::{
        solana_program::{
            account_info::AccountInfo,
            entrypoint::ProgramResult,
            instruction::{AccountMeta, Instruction},
            program::{invoke, invoke_signed},
            program_error::ProgramError,
            pubkey::Pubkey,
            rent::Rent,
            system_instruction,
            sysvar::Sysvar,
        },
        AccountDeserialize, InstructionData, ToAccountMetas,
    },
    raffle::{constants::DEV_SUBSCRIPTION_FUNDING, oracle, state::Raffle},
    solana_program_test::{processor, BanksClientError, ProgramTest, ProgramTestContext},
    solana_sdk::{
        clock::Clock,
        signature::{Keypair, Signer},
        transaction::{Transaction, TransactionError},
    },
};

/// Program id the mock coordinator is registered at.
pub const COORDINATOR_ID: Pubkey = Pubkey::new_from_array([192u8; 32]);

/// Native mock of the randomness coordinator.
///
/// Implements the wire protocol in `raffle::oracle`: subscriptions are real
/// accounts it owns, requests are accepted when the subscription is funded,
/// and `fulfill_random_words` relays a callback into the target program
/// signed by the coordinator's identity PDA, the same way the live
/// coordinator executes fulfillments.
pub fn mock_coordinator_process(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    data: &[u8],
) -> ProgramResult {
    if data.len() < 8 {
        return Err(ProgramError::InvalidInstructionData);
    }
    let (tag, rest) = data.split_at(8);

    if tag == oracle::sighash("create_subscription") {
        // accounts: [payer, subscription, system_program]
        let payer = &accounts[0];
        let subscription = &accounts[1];
        let system_program = &accounts[2];
        let space = 8usize;
        let lamports = Rent::get()?.minimum_balance(space);
        invoke(
            &system_instruction::create_account(
                payer.key,
                subscription.key,
                lamports,
                space as u64,
                program_id,
            ),
            &[payer.clone(), subscription.clone(), system_program.clone()],
        )
    } else if tag == oracle::sighash("fund_subscription") {
        // accounts: [payer, subscription, system_program]
        let payer = &accounts[0];
        let subscription = &accounts[1];
        let system_program = &accounts[2];
        let amount = u64::from_le_bytes(
            rest.get(..8)
                .ok_or(ProgramError::InvalidInstructionData)?
                .try_into()
                .unwrap(),
        );
        invoke(
            &system_instruction::transfer(payer.key, subscription.key, amount),
            &[payer.clone(), subscription.clone(), system_program.clone()],
        )
    } else if tag == oracle::sighash("request_randomness") {
        // accounts: [subscription]
        let subscription = &accounts[0];
        if subscription.owner != program_id {
            return Err(ProgramError::IllegalOwner);
        }
        if subscription.lamports() == 0 {
            return Err(ProgramError::InsufficientFunds);
        }
        Ok(())
    } else if tag == oracle::sighash("fulfill_random_words") {
        // accounts: [target_program, identity, callback accounts...]
        // Everything after the tag is forwarded verbatim as the callback data.
        let target_program = &accounts[0];
        let identity = &accounts[1];
        let (_, bump) = Pubkey::find_program_address(&[oracle::IDENTITY_SEED], program_id);

        let mut metas = vec![AccountMeta::new_readonly(*identity.key, true)];
        for info in &accounts[2..] {
            metas.push(if info.is_writable {
                AccountMeta::new(*info.key, false)
            } else {
                AccountMeta::new_readonly(*info.key, false)
            });
        }

        let mut infos = vec![identity.clone()];
        infos.extend(accounts[2..].iter().cloned());
        infos.push(target_program.clone());

        let callback = Instruction {
            program_id: *target_program.key,
            accounts: metas,
            data: rest.to_vec(),
        };
        invoke_signed(&callback, &infos, &[&[oracle::IDENTITY_SEED, &[bump]]])
    } else {
        Err(ProgramError::InvalidInstructionData)
    }
}

pub struct TestRaffle {
    pub context: ProgramTestContext,
    pub coordinator: Pubkey,
    pub subscription: Pubkey,
    pub identity: Pubkey,
    pub raffle: Pubkey,
    pub vault: Pubkey,
    pub entrance_fee: u64,
    pub interval: i64,
}

/// Adapt anchor's `entry`, whose signature ties the account slice and element
/// lifetimes (`&'info [AccountInfo<'info>]`), to the independent-lifetime
/// `ProcessInstruction` signature that `processor!` expects.
fn raffle_entry(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    let accounts = Box::leak(Box::new(accounts.to_vec()));
    raffle::entry(program_id, accounts, data)
}

/// Stand up a fresh raffle wired to the mock coordinator.
pub async fn setup(entrance_fee: u64, interval: i64) -> TestRaffle {
    let mut program_test = ProgramTest::new("raffle", raffle::ID, processor!(raffle_entry));
    program_test.add_program(
        "coordinator",
        COORDINATOR_ID,
        processor!(mock_coordinator_process),
    );
    let mut context = program_test.start_with_context().await;

    let payer_pubkey = context.payer.pubkey();
    let subscription = Keypair::new();
    let (raffle_pda, _) = Pubkey::find_program_address(&[b"raffle"], &raffle::ID);
    let (vault_pda, _) = Pubkey::find_program_address(&[b"vault"], &raffle::ID);

    let create_ix =
        oracle::create_subscription_ix(COORDINATOR_ID, payer_pubkey, subscription.pubkey());
    let fund_ix = oracle::fund_subscription_ix(
        COORDINATOR_ID,
        payer_pubkey,
        subscription.pubkey(),
        DEV_SUBSCRIPTION_FUNDING,
    );
    let init_ix = Instruction {
        program_id: raffle::ID,
        accounts: raffle::accounts::Initialize {
            raffle: raffle_pda,
            vault: vault_pda,
            authority: payer_pubkey,
            coordinator: COORDINATOR_ID,
            subscription: subscription.pubkey(),
            system_program: solana_sdk::system_program::ID,
        }
        .to_account_metas(None),
        data: raffle::instruction::Initialize {
            entrance_fee,
            interval,
        }
        .data(),
    };

    let blockhash = context.banks_client.get_latest_blockhash().await.unwrap();
    let tx = Transaction::new_signed_with_payer(
        &[create_ix, fund_ix, init_ix],
        Some(&payer_pubkey),
        &[&context.payer, &subscription],
        blockhash,
    );
    context
        .banks_client
        .process_transaction(tx)
        .await
        .expect("provisioning the raffle should succeed");

    TestRaffle {
        context,
        coordinator: COORDINATOR_ID,
        subscription: subscription.pubkey(),
        identity: oracle::identity_pda(&COORDINATOR_ID),
        raffle: raffle_pda,
        vault: vault_pda,
        entrance_fee,
        interval,
    }
}

impl TestRaffle {
    /// Send instructions in one transaction paid by the context payer.
    pub async fn process(
        &mut self,
        instructions: &[Instruction],
        signers: &[&Keypair],
    ) -> Result<(), BanksClientError> {
        let payer_pubkey = self.context.payer.pubkey();
        let mut all_signers: Vec<&Keypair> = vec![&self.context.payer];
        for signer in signers {
            if signer.pubkey() != payer_pubkey {
                all_signers.push(signer);
            }
        }

        let blockhash = self.context.banks_client.get_latest_blockhash().await?;
        let tx = Transaction::new_signed_with_payer(
            instructions,
            Some(&payer_pubkey),
            &all_signers,
            blockhash,
        );
        self.context.banks_client.process_transaction(tx).await
    }

    pub async fn raffle_state(&mut self) -> Raffle {
        let account = self
            .context
            .banks_client
            .get_account(self.raffle)
            .await
            .unwrap()
            .expect("raffle account must exist");
        Raffle::try_deserialize(&mut account.data.as_slice())
            .expect("raffle account must deserialize")
    }

    pub async fn balance(&mut self, address: Pubkey) -> u64 {
        self.context.banks_client.get_balance(address).await.unwrap()
    }

    /// Move the bank clock past the upkeep interval.
    pub async fn warp_past_interval(&mut self) {
        let mut clock: Clock = self.context.banks_client.get_sysvar().await.unwrap();
        clock.unix_timestamp += self.interval + 1;
        self.context.set_sysvar(&clock);
    }

    pub fn enter_ix(&self, player: Pubkey, amount: u64) -> Instruction {
        Instruction {
            program_id: raffle::ID,
            accounts: raffle::accounts::EnterRaffle {
                raffle: self.raffle,
                vault: self.vault,
                player,
                system_program: solana_sdk::system_program::ID,
            }
            .to_account_metas(None),
            data: raffle::instruction::EnterRaffle { amount }.data(),
        }
    }

    pub fn check_upkeep_ix(&self) -> Instruction {
        Instruction {
            program_id: raffle::ID,
            accounts: raffle::accounts::CheckUpkeep {
                raffle: self.raffle,
            }
            .to_account_metas(None),
            data: raffle::instruction::CheckUpkeep {}.data(),
        }
    }

    pub fn perform_upkeep_ix(&self) -> Instruction {
        raffle::instructions::perform_upkeep_instruction(
            self.raffle,
            self.vault,
            self.coordinator,
            self.subscription,
        )
    }

    /// Fulfillment as the live coordinator would deliver it: through the
    /// coordinator, which relays into the raffle signed by its identity PDA.
    pub fn fulfill_ix(
        &self,
        request_id: u64,
        randomness: [u8; 32],
        players: &[Pubkey],
    ) -> Instruction {
        let mut accounts = vec![
            AccountMeta::new_readonly(raffle::ID, false),
            AccountMeta::new_readonly(self.identity, false),
            AccountMeta::new(self.raffle, false),
            AccountMeta::new(self.vault, false),
        ];
        for player in players {
            accounts.push(AccountMeta::new(*player, false));
        }

        let mut data = oracle::sighash("fulfill_random_words").to_vec();
        data.extend_from_slice(
            &raffle::instruction::FulfillRandomness {
                request_id,
                randomness,
            }
            .data(),
        );

        Instruction {
            program_id: self.coordinator,
            accounts,
            data,
        }
    }
}

/// Assert a transaction failed with the given program error code.
pub fn assert_raffle_error(result: Result<(), BanksClientError>, expected_code: u32) {
    match result {
        Err(BanksClientError::TransactionError(TransactionError::InstructionError(
            _,
            solana_sdk::instruction::InstructionError::Custom(code),
        ))) => {
            assert_eq!(code, expected_code, "unexpected custom error code");
        }
        other => panic!("expected custom error {}, got {:?}", expected_code, other),
    }
}
