//! The engine: one named operation per ledger transaction.

use std::sync::Arc;

use adsettle_contract::{
    get_contract, project_key, set_account, ConfirmOutcome, ContractRegistry, EscrowLedger,
    SubmissionProtocol,
};
use adsettle_crypto::Signer;
use adsettle_evidence::EvidenceFetcher;
use adsettle_settlement::{CreditPolicy, SettlementEngine};
use adsettle_store::{StateKey, StateStore, Transaction};
use adsettle_types::{Clock, PartyId, PublicKey};

use crate::config::EngineConfig;
use crate::ops::{
    parse_arg, parse_contract_key, parse_private_key, parse_terms, Operation,
};
use crate::tracing_spans::{operation_span, settlement_span};
use crate::NodeError;

/// Collaborators and policies behind every operation.
///
/// The engine holds no state of its own: each call opens a transaction on
/// the store, runs one operation and commits it at the clock's current time.
/// A failed operation commits nothing.
pub struct Engine {
    store: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
    signer: Arc<dyn Signer>,
    fetcher: Arc<dyn EvidenceFetcher>,
    escrow: EscrowLedger,
    credit_policy: CreditPolicy,
}

impl Engine {
    pub fn new(
        store: Arc<dyn StateStore>,
        clock: Arc<dyn Clock>,
        signer: Arc<dyn Signer>,
        fetcher: Arc<dyn EvidenceFetcher>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            store,
            clock,
            signer,
            fetcher,
            escrow: EscrowLedger::new(config.escrow_lock_secs),
            credit_policy: config.credit_policy(),
        }
    }

    /// Run the operation named `op` on behalf of `caller`.
    ///
    /// Errors are returned as-is; their `Display` text is the failure reason
    /// reported to the caller.
    pub fn invoke(&self, caller: &str, op: &str, args: &[String]) -> Result<String, NodeError> {
        let span = operation_span(op, caller);
        let _guard = span.enter();

        let result = PartyId::parse(caller)
            .map_err(NodeError::from)
            .and_then(|caller| {
                let op: Operation = op.parse()?;
                op.check_arity(args)?;
                self.run(&caller, op, args)
            });
        match &result {
            Ok(_) => tracing::debug!("operation succeeded"),
            Err(e) => tracing::warn!(error = %e, "operation rejected"),
        }
        result
    }

    fn run(&self, caller: &PartyId, op: Operation, args: &[String]) -> Result<String, NodeError> {
        let now = self.clock.now();
        let mut txn = Transaction::begin(self.store.as_ref());
        let signer = self.signer.as_ref();

        let output = match op {
            Operation::SetAccount => {
                let account = set_account(
                    &mut txn,
                    caller,
                    parse_arg("role", &args[0])?,
                    parse_arg("credit", &args[1])?,
                    parse_arg("assets", &args[2])?,
                    PublicKey::from_hex(&args[3])
                        .map_err(|e| NodeError::InvalidArgument(format!("publicKey: {e}")))?,
                )?;
                serde_json::to_string(&account)?
            }
            Operation::GeneratorContract => {
                let terms = parse_terms(args)?;
                let key = parse_private_key(&args[7])?;
                ContractRegistry::new(signer, self.escrow)
                    .generate_contract(&mut txn, caller, terms, &key, now)?
                    .to_string()
            }
            Operation::AdvertiserMediaAntiConfirm => {
                let contract_key = parse_contract_key(&args[0])?;
                let key = args.get(1).map(|raw| parse_private_key(raw)).transpose()?;
                let outcome = ContractRegistry::new(signer, self.escrow).confirm_contract(
                    &mut txn,
                    caller,
                    &contract_key,
                    key.as_ref(),
                )?;
                match outcome {
                    ConfirmOutcome::Signed { have, need } => format!("signed {have}/{need}"),
                    ConfirmOutcome::Published => "published".to_string(),
                    ConfirmOutcome::AlreadyPublished => "already published".to_string(),
                }
            }
            Operation::MediaSubmit => {
                let contract_key = parse_contract_key(&args[0])?;
                let key = parse_private_key(&args[2])?;
                SubmissionProtocol::new(signer).submit_media_log(
                    &mut txn,
                    caller,
                    &contract_key,
                    &args[1],
                    &key,
                    now,
                )?;
                StateKey::Log(contract_key).encode()
            }
            Operation::AntiCheatConfirm => {
                let contract_key = parse_contract_key(&args[0])?;
                let key = parse_private_key(&args[2])?;
                let (have, need) = SubmissionProtocol::new(signer).confirm_anti_cheat_result(
                    &mut txn,
                    caller,
                    &contract_key,
                    &args[1],
                    &key,
                )?;
                format!("confirmed {have}/{need}")
            }
            Operation::SettleAccount => {
                let contract_key = parse_contract_key(&args[0])?;
                let span = settlement_span(contract_key.as_str());
                let _guard = span.enter();
                let record = SettlementEngine::new(signer, self.fetcher.as_ref(), self.credit_policy)
                    .settle(&mut txn, caller, &contract_key, now)?;
                serde_json::to_string(&record)?
            }
            Operation::AdvertiserChargeGet => {
                let contract_key = parse_contract_key(&args[0])?;
                self.escrow
                    .collect(&mut txn, caller, &contract_key, now)?
                    .to_string()
            }
            Operation::GetContract => {
                let contract_key = parse_contract_key(&args[0])?;
                serde_json::to_string(&get_contract(&txn, &contract_key)?)?
            }
            Operation::GetContractList => {
                project_key(&txn, &StateKey::ContractIndex(caller.clone()))?
            }
            Operation::GetAllConfirmContractKey => {
                project_key(&txn, &StateKey::ConfirmIndex(caller.clone()))?
            }
            Operation::GetLogList => project_key(&txn, &StateKey::LogIndex(caller.clone()))?,
        };

        if op.is_mutating() {
            let writes = txn.commit(now)?;
            tracing::debug!(writes, at = %now, "transaction committed");
        }
        Ok(output)
    }
}
