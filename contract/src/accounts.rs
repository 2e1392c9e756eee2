//! Identity and account ledger adapter.

use crate::error::ContractError;
use adsettle_store::{Account, AccountStore, Transaction};
use adsettle_types::{Amount, Credit, PartyId, PublicKey, Role};

/// Create or overwrite the caller's account.
pub fn set_account(
    txn: &mut Transaction<'_>,
    caller: &PartyId,
    role: Role,
    credit: Credit,
    assets: Amount,
    public_key: PublicKey,
) -> Result<Account, ContractError> {
    let account = Account {
        role,
        credit,
        assets,
        public_key,
    };
    txn.put_account(caller, &account)?;
    tracing::info!(party = %caller, role = %role, "account set");
    Ok(account)
}

/// Load `party`'s account and check it holds `role`.
pub fn require_role(
    txn: &Transaction<'_>,
    party: &PartyId,
    role: Role,
) -> Result<Account, ContractError> {
    let account = txn.get_account(party)?;
    if account.role != role {
        return Err(ContractError::InvalidArgument(format!(
            "{party} is a {} account, expected {role}",
            account.role
        )));
    }
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use adsettle_nullables::NullStateStore;
    use adsettle_types::Timestamp;

    #[test]
    fn set_account_overwrites() {
        let store = NullStateStore::new();
        let id = PartyId::parse("media").unwrap();
        let mut txn = Transaction::begin(&store);
        set_account(&mut txn, &id, Role::Media, Credit::ZERO, Amount::from_units(5), PublicKey([1; 32])).unwrap();
        set_account(&mut txn, &id, Role::Media, "3".parse().unwrap(), Amount::from_units(7), PublicKey([1; 32])).unwrap();
        txn.commit(Timestamp::new(1)).unwrap();

        let txn = Transaction::begin(&store);
        let account = txn.get_account(&id).unwrap();
        assert_eq!(account.assets, Amount::from_units(7));
        assert_eq!(account.credit.to_string(), "3");
    }

    #[test]
    fn role_mismatch_is_rejected() {
        let store = NullStateStore::new();
        let id = PartyId::parse("ac1").unwrap();
        let mut txn = Transaction::begin(&store);
        set_account(&mut txn, &id, Role::AntiCheat, Credit::ZERO, Amount::from_units(0), PublicKey([2; 32])).unwrap();
        assert!(require_role(&txn, &id, Role::AntiCheat).is_ok());
        assert!(matches!(
            require_role(&txn, &id, Role::Media),
            Err(ContractError::InvalidArgument(_))
        ));
        assert!(matches!(
            require_role(&txn, &PartyId::parse("ghost").unwrap(), Role::Media),
            Err(ContractError::NotFound(_))
        ));
    }
}
