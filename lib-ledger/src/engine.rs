//! Token Engine
//!
//! Orchestrates every state-changing operation. Each operation validates
//! all of its preconditions first, then mutates the ledger, then appends
//! events. A rejected operation leaves every piece of state untouched.

use serde::{Deserialize, Serialize};

use lib_types::{Address, Amount, TokenId};

use crate::custody::{safe_transfer, AssetCustody, InMemoryCustody};
use crate::errors::{LedgerError, LedgerResult};
use crate::events::{EventLog, LedgerEvent};
use crate::fees::FeeSplit;
use crate::roles::{Role, RoleRegistry};
use crate::store::LedgerStore;

/// Display metadata of the ledger's token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenMetadata {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
        }
    }

    pub fn token_id(&self) -> TokenId {
        TokenId::derive(&self.name, &self.symbol, self.decimals)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseState {
    Active,
    Paused,
}

/// Result of a successful transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Total debited from the sender
    pub amount: Amount,
    /// Credited to the recipient
    pub net: Amount,
    /// Credited to the treasury
    pub fee: Amount,
}

#[derive(Debug)]
pub struct TokenEngine {
    token_id: TokenId,
    metadata: TokenMetadata,
    contract_account: Address,
    ledger: LedgerStore,
    roles: RoleRegistry,
    treasury: Address,
    pause_state: PauseState,
    events: EventLog,
    custody: Box<dyn AssetCustody>,
}

impl TokenEngine {
    /// Deploy a new ledger.
    ///
    /// The deployer receives every role and the whole initial supply.
    pub fn new(
        deployer: Address,
        contract_account: Address,
        metadata: TokenMetadata,
        initial_supply: Amount,
        treasury: Address,
    ) -> LedgerResult<Self> {
        require_non_null(&treasury, "treasury")?;
        require_non_null(&deployer, "deployer")?;
        require_non_null(&contract_account, "contract account")?;
        require_not_contract(&deployer, &contract_account, "deployer")?;
        require_not_contract(&treasury, &contract_account, "treasury")?;

        let mut ledger = LedgerStore::new();
        ledger.credit(&deployer, initial_supply)?;

        let engine = Self {
            token_id: metadata.token_id(),
            metadata,
            contract_account,
            ledger,
            roles: RoleRegistry::with_admin(deployer),
            treasury,
            pause_state: PauseState::Active,
            events: EventLog::new(),
            custody: Box::new(InMemoryCustody::new()),
        };

        tracing::info!(
            token = %engine.token_id,
            symbol = %engine.metadata.symbol,
            %deployer,
            %treasury,
            initial_supply,
            "ledger deployed"
        );
        Ok(engine)
    }

    /// Replace the custody backend used for rescuing external assets
    pub fn with_custody(mut self, custody: Box<dyn AssetCustody>) -> Self {
        self.custody = custody;
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_state(
        metadata: TokenMetadata,
        contract_account: Address,
        ledger: LedgerStore,
        roles: RoleRegistry,
        treasury: Address,
        pause_state: PauseState,
        events: EventLog,
        custody: Box<dyn AssetCustody>,
    ) -> Self {
        Self {
            token_id: metadata.token_id(),
            metadata,
            contract_account,
            ledger,
            roles,
            treasury,
            pause_state,
            events,
            custody,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.ledger.balance_of(account)
    }

    pub fn total_supply(&self) -> Amount {
        self.ledger.total_supply()
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.roles.has_role(role, account)
    }

    pub fn treasury(&self) -> Address {
        self.treasury
    }

    pub fn is_paused(&self) -> bool {
        self.pause_state == PauseState::Paused
    }

    pub fn pause_state(&self) -> PauseState {
        self.pause_state
    }

    pub fn contract_account(&self) -> Address {
        self.contract_account
    }

    pub fn token_id(&self) -> TokenId {
        self.token_id
    }

    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    pub fn roles(&self) -> &RoleRegistry {
        &self.roles
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn custody(&self) -> &dyn AssetCustody {
        self.custody.as_ref()
    }

    pub fn custody_mut(&mut self) -> &mut dyn AssetCustody {
        self.custody.as_mut()
    }

    // =========================================================================
    // Supply
    // =========================================================================

    /// Issue `amount` to `to`. Allowed while paused.
    pub fn mint(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: Amount,
        verification_id: &str,
    ) -> LedgerResult<()> {
        self.require_role(Role::Verifier, caller)?;
        require_non_null(to, "mint recipient")?;
        if verification_id.is_empty() {
            tracing::warn!(%caller, "mint rejected: empty verification id");
            return Err(LedgerError::MissingVerification);
        }

        self.ledger.credit(to, amount)?;
        self.events.append(LedgerEvent::CreditsMinted {
            to: *to,
            amount,
            verification_id: verification_id.to_string(),
        });

        tracing::info!(%caller, %to, amount, verification_id, "credits minted");
        Ok(())
    }

    /// Destroy `amount` of the caller's own balance. No fee, not paused.
    pub fn burn(&mut self, caller: &Address, amount: Amount) -> LedgerResult<()> {
        self.ledger.burn(caller, amount)?;
        self.events.append(LedgerEvent::Burned {
            holder: *caller,
            amount,
        });

        tracing::info!(%caller, amount, "credits burned");
        Ok(())
    }

    // =========================================================================
    // Transfer
    // =========================================================================

    /// Send `amount` from the caller to `to`, routing the fee to the treasury.
    pub fn transfer(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: Amount,
    ) -> LedgerResult<TransferReceipt> {
        if self.is_paused() {
            tracing::warn!(%caller, "transfer rejected: ledger paused");
            return Err(LedgerError::Paused);
        }
        require_non_null(to, "transfer recipient")?;
        if *to == self.contract_account {
            return Err(LedgerError::InvalidRecipient(
                "transfers to the contract account are not allowed".to_string(),
            ));
        }

        let available = self.ledger.balance_of(caller);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                available,
                required: amount,
            });
        }

        let split = FeeSplit::transfer(amount);

        // net + fee == amount <= balance: neither move can fail past this point
        self.ledger.move_balance(caller, to, split.net)?;
        self.events.append(LedgerEvent::Transfer {
            from: *caller,
            to: *to,
            amount: split.net,
        });

        if split.fee > 0 {
            let treasury = self.treasury;
            self.ledger.move_balance(caller, &treasury, split.fee)?;
            self.events.append(LedgerEvent::Transfer {
                from: *caller,
                to: treasury,
                amount: split.fee,
            });
            self.events.append(LedgerEvent::FeeCollected {
                from: *caller,
                fee: split.fee,
            });
        }

        tracing::debug!(%caller, %to, amount, net = split.net, fee = split.fee, "transfer applied");
        Ok(TransferReceipt {
            amount,
            net: split.net,
            fee: split.fee,
        })
    }

    // =========================================================================
    // Emergency controls
    // =========================================================================

    /// Stop transfers. Pausing an already paused ledger is a no-op.
    pub fn pause(&mut self, caller: &Address) -> LedgerResult<()> {
        self.require_role(Role::Pauser, caller)?;
        if self.pause_state == PauseState::Paused {
            return Ok(());
        }
        self.pause_state = PauseState::Paused;
        self.events.append(LedgerEvent::Paused { by: *caller });
        tracing::info!(%caller, "ledger paused");
        Ok(())
    }

    /// Resume transfers. Unpausing an active ledger is a no-op.
    pub fn unpause(&mut self, caller: &Address) -> LedgerResult<()> {
        self.require_role(Role::Pauser, caller)?;
        if self.pause_state == PauseState::Active {
            return Ok(());
        }
        self.pause_state = PauseState::Active;
        self.events.append(LedgerEvent::Unpaused { by: *caller });
        tracing::info!(%caller, "ledger unpaused");
        Ok(())
    }

    /// Recover an asset held by the contract account.
    ///
    /// For this ledger's own token the contract account is debited like any
    /// other holder. Any other token goes through the custody backend, and a
    /// refused custody transfer is an error.
    pub fn rescue(
        &mut self,
        caller: &Address,
        token: &TokenId,
        to: &Address,
        amount: Amount,
    ) -> LedgerResult<()> {
        self.require_role(Role::Administrator, caller)?;
        require_non_null(to, "rescue recipient")?;

        let vault = self.contract_account;
        if *token == self.token_id {
            self.ledger.move_balance(&vault, to, amount)?;
            self.events.append(LedgerEvent::Transfer {
                from: vault,
                to: *to,
                amount,
            });
        } else {
            safe_transfer(self.custody.as_mut(), token, &vault, to, amount)?;
        }

        self.events.append(LedgerEvent::TokensRescued {
            token: *token,
            to: *to,
            amount,
        });
        tracing::info!(%caller, %token, %to, amount, "tokens rescued");
        Ok(())
    }

    pub fn set_treasury(&mut self, caller: &Address, new_treasury: &Address) -> LedgerResult<()> {
        self.require_role(Role::Administrator, caller)?;
        require_non_null(new_treasury, "treasury")?;
        require_not_contract(new_treasury, &self.contract_account, "treasury")?;

        let previous = std::mem::replace(&mut self.treasury, *new_treasury);
        self.events.append(LedgerEvent::TreasuryUpdated {
            previous,
            current: *new_treasury,
        });
        tracing::info!(%caller, %previous, current = %new_treasury, "treasury updated");
        Ok(())
    }

    // =========================================================================
    // Role administration
    // =========================================================================

    pub fn grant_role(&mut self, caller: &Address, role: Role, account: &Address) -> LedgerResult<()> {
        self.require_role(Role::Administrator, caller)?;
        require_non_null(account, "role grantee")?;

        if self.roles.grant(role, *account) {
            self.events.append(LedgerEvent::RoleGranted {
                role,
                account: *account,
                sender: *caller,
            });
            tracing::info!(%caller, %role, %account, "role granted");
        }
        Ok(())
    }

    pub fn revoke_role(&mut self, caller: &Address, role: Role, account: &Address) -> LedgerResult<()> {
        self.require_role(Role::Administrator, caller)?;
        self.remove_role(caller, role, account)
    }

    /// Drop one of the caller's own roles
    pub fn renounce_role(&mut self, caller: &Address, role: Role) -> LedgerResult<()> {
        self.remove_role(caller, role, caller)
    }

    fn remove_role(&mut self, sender: &Address, role: Role, account: &Address) -> LedgerResult<()> {
        if role == Role::Administrator
            && self.roles.has_role(role, account)
            && self.roles.member_count(role) == 1
        {
            tracing::warn!(%sender, %account, "rejected removal of the last administrator");
            return Err(LedgerError::LastAdministrator);
        }

        if self.roles.revoke(role, account) {
            self.events.append(LedgerEvent::RoleRevoked {
                role,
                account: *account,
                sender: *sender,
            });
            tracing::info!(%sender, %role, %account, "role revoked");
        }
        Ok(())
    }

    fn require_role(&self, role: Role, caller: &Address) -> LedgerResult<()> {
        if !self.roles.has_role(role, caller) {
            tracing::warn!(%caller, %role, "rejected: caller lacks role");
            return Err(LedgerError::Unauthorized {
                role,
                caller: *caller,
            });
        }
        Ok(())
    }
}

fn require_non_null(address: &Address, what: &str) -> LedgerResult<()> {
    if address.is_zero() {
        return Err(LedgerError::InvalidRecipient(format!("{} is the null address", what)));
    }
    Ok(())
}

/// The contract account only receives tokens through issuance
fn require_not_contract(address: &Address, contract_account: &Address, what: &str) -> LedgerResult<()> {
    if address == contract_account {
        return Err(LedgerError::InvalidRecipient(format!("{} is the contract account", what)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: Address = Address::new([1u8; 32]);
    const CONTRACT: Address = Address::new([2u8; 32]);
    const TREASURY: Address = Address::new([3u8; 32]);
    const USER: Address = Address::new([4u8; 32]);
    const RECIPIENT: Address = Address::new([5u8; 32]);

    fn engine(initial_supply: Amount) -> TokenEngine {
        TokenEngine::new(
            ADMIN,
            CONTRACT,
            TokenMetadata::new("Carbon Credit", "CC", 18),
            initial_supply,
            TREASURY,
        )
        .unwrap()
    }

    #[test]
    fn test_construction_seeds_admin() {
        let engine = engine(1_000);
        assert_eq!(engine.balance_of(&ADMIN), 1_000);
        assert_eq!(engine.total_supply(), 1_000);
        for role in Role::ALL {
            assert!(engine.has_role(role, &ADMIN));
        }
        assert!(!engine.is_paused());
        assert_eq!(engine.treasury(), TREASURY);
        assert!(engine.events().is_empty());
        assert_eq!(engine.token_id(), TokenId::derive("Carbon Credit", "CC", 18));
    }

    #[test]
    fn test_construction_rejects_null_treasury() {
        let result = TokenEngine::new(
            ADMIN,
            CONTRACT,
            TokenMetadata::new("Carbon Credit", "CC", 18),
            1_000,
            Address::zero(),
        );
        assert!(matches!(result, Err(LedgerError::InvalidRecipient(_))));
    }

    #[test]
    fn test_construction_rejects_contract_aliases() {
        let metadata = TokenMetadata::new("Carbon Credit", "CC", 18);

        let deployer_is_contract =
            TokenEngine::new(ADMIN, ADMIN, metadata.clone(), 1_000, TREASURY);
        assert!(matches!(
            deployer_is_contract,
            Err(LedgerError::InvalidRecipient(msg)) if msg.contains("deployer")
        ));

        let treasury_is_contract = TokenEngine::new(ADMIN, CONTRACT, metadata, 1_000, CONTRACT);
        assert!(matches!(
            treasury_is_contract,
            Err(LedgerError::InvalidRecipient(msg)) if msg.contains("treasury")
        ));
    }

    #[test]
    fn test_mint_checks_in_order() {
        let mut engine = engine(0);
        assert!(matches!(
            engine.mint(&USER, &Address::zero(), 1, ""),
            Err(LedgerError::Unauthorized { role: Role::Verifier, .. })
        ));
        assert!(matches!(
            engine.mint(&ADMIN, &Address::zero(), 1, ""),
            Err(LedgerError::InvalidRecipient(_))
        ));
        assert_eq!(
            engine.mint(&ADMIN, &USER, 1, ""),
            Err(LedgerError::MissingVerification)
        );
        assert_eq!(engine.total_supply(), 0);
        assert!(engine.events().is_empty());
    }

    #[test]
    fn test_transfer_splits_fee() {
        let mut engine = engine(20_000);
        let receipt = engine.transfer(&ADMIN, &RECIPIENT, 10_000).unwrap();

        assert_eq!(receipt, TransferReceipt { amount: 10_000, net: 9_990, fee: 10 });
        assert_eq!(engine.balance_of(&ADMIN), 10_000);
        assert_eq!(engine.balance_of(&RECIPIENT), 9_990);
        assert_eq!(engine.balance_of(&TREASURY), 10);
        assert_eq!(engine.total_supply(), 20_000);

        let kinds: Vec<_> = engine.events().iter().map(LedgerEvent::kind).collect();
        assert_eq!(kinds, vec!["Transfer", "Transfer", "FeeCollected"]);
    }

    #[test]
    fn test_self_transfer_only_pays_fee() {
        let mut engine = engine(10_000);
        let receipt = engine.transfer(&ADMIN, &ADMIN, 10_000).unwrap();
        assert_eq!(receipt.fee, 10);
        assert_eq!(engine.balance_of(&ADMIN), 9_990);
        assert_eq!(engine.balance_of(&TREASURY), 10);
    }

    #[test]
    fn test_zero_transfer() {
        let mut engine = engine(10);
        let receipt = engine.transfer(&ADMIN, &RECIPIENT, 0).unwrap();
        assert_eq!(receipt, TransferReceipt { amount: 0, net: 0, fee: 0 });
        assert_eq!(engine.balance_of(&ADMIN), 10);
    }

    #[test]
    fn test_pause_is_idempotent() {
        let mut engine = engine(0);
        engine.pause(&ADMIN).unwrap();
        engine.pause(&ADMIN).unwrap();
        assert!(engine.is_paused());
        assert_eq!(engine.events().len(), 1);

        engine.unpause(&ADMIN).unwrap();
        engine.unpause(&ADMIN).unwrap();
        assert_eq!(engine.pause_state(), PauseState::Active);
        assert_eq!(engine.events().len(), 2);
    }

    #[test]
    fn test_last_administrator_cannot_leave() {
        let mut engine = engine(0);
        assert_eq!(
            engine.renounce_role(&ADMIN, Role::Administrator),
            Err(LedgerError::LastAdministrator)
        );
        assert_eq!(
            engine.revoke_role(&ADMIN, Role::Administrator, &ADMIN),
            Err(LedgerError::LastAdministrator)
        );

        engine.grant_role(&ADMIN, Role::Administrator, &USER).unwrap();
        engine.renounce_role(&ADMIN, Role::Administrator).unwrap();
        assert!(!engine.has_role(Role::Administrator, &ADMIN));
        assert!(engine.has_role(Role::Administrator, &USER));
    }

    #[test]
    fn test_role_events_only_on_change() {
        let mut engine = engine(0);
        engine.grant_role(&ADMIN, Role::Verifier, &USER).unwrap();
        engine.grant_role(&ADMIN, Role::Verifier, &USER).unwrap();
        engine.revoke_role(&ADMIN, Role::Pauser, &USER).unwrap();
        assert_eq!(engine.events().len(), 1);
        assert_eq!(
            engine.events().last(),
            Some(&LedgerEvent::RoleGranted {
                role: Role::Verifier,
                account: USER,
                sender: ADMIN,
            })
        );
    }
}
