//! LOAN Incentive Token Contract
//!
//! A second CEP-18-style ledger, identical to FURUSD's transfer/approve
//! surface, with one addition required by the non-goal-bounded "user-facing
//! token transfer restriction policy": for the first year after deployment,
//! the designated admin/multisig account cannot transfer LOAN out, except to
//! an address the Vesting Factory recognizes as a genuine lock contract.
//! This prevents a pre-mine dump while still letting the admin fund vesting
//! locks during the restricted window.

use odra::prelude::*;
use odra::casper_types::{U256, runtime_args, RuntimeArgs};
use odra::CallDef;
use crate::errors::CdpError;

/// Seconds in the first-year lock-up window.
pub const ONE_YEAR_SECONDS: u64 = 365 * 24 * 60 * 60;

/// LOAN incentive token
#[odra::module]
pub struct LoanToken {
    name: Var<String>,
    symbol: Var<String>,
    decimals: Var<u8>,
    total_supply: Var<U256>,
    balances: Mapping<Address, U256>,
    allowances: Mapping<(Address, Address), U256>,
    /// Registry contract address, used to resolve the vesting factory for the allow-list check
    registry: Var<Address>,
    /// Account restricted from transferring out during the lock-up window
    locked_sender: Var<Address>,
    /// Timestamp the lock-up window started
    deployment_timestamp: Var<u64>,
}

#[odra::module]
impl LoanToken {
    pub fn init(
        &mut self,
        registry: Address,
        locked_sender: Address,
        name: String,
        symbol: String,
        decimals: u8,
        initial_supply: U256,
        initial_holder: Address,
    ) {
        self.registry.set(registry);
        self.locked_sender.set(locked_sender);
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(decimals);
        self.total_supply.set(initial_supply);
        self.balances.set(&initial_holder, initial_supply);
        self.deployment_timestamp.set(self.env().get_block_time());
    }

    pub fn name(&self) -> String {
        self.name.get().unwrap_or_default()
    }

    pub fn symbol(&self) -> String {
        self.symbol.get().unwrap_or_default()
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get().unwrap_or(18)
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get().unwrap_or(U256::zero())
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).unwrap_or(U256::zero())
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or(U256::zero())
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        let caller = self.env().caller();
        self.check_transfer_restriction(caller, recipient);
        self.move_balance(caller, recipient, amount);
    }

    pub fn approve(&mut self, spender: Address, amount: U256) {
        let caller = self.env().caller();
        self.allowances.set(&(caller, spender), amount);
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        let spender = self.env().caller();
        self.check_transfer_restriction(owner, recipient);
        let current = self.allowance(owner, spender);
        if current < amount {
            self.env().revert(CdpError::InsufficientAllowance);
        }
        self.allowances.set(&(owner, spender), current - amount);
        self.move_balance(owner, recipient, amount);
    }

    /// Whether `from` is still inside the restricted lock-up window.
    pub fn is_transfer_restricted(&self, from: Address) -> bool {
        let locked_sender = self.locked_sender.get();
        if Some(from) != locked_sender {
            return false;
        }
        let deployed_at = self.deployment_timestamp.get().unwrap_or(0);
        let now = self.env().get_block_time();
        now < deployed_at.saturating_add(ONE_YEAR_SECONDS)
    }

    fn check_transfer_restriction(&self, from: Address, to: Address) {
        if !self.is_transfer_restricted(from) {
            return;
        }
        if !self.is_registered_lock(to) {
            self.env().revert(CdpError::TransferRestricted);
        }
    }

    fn is_registered_lock(&self, addr: Address) -> bool {
        let factory = match self.registry_vesting_factory() {
            Some(f) => f,
            None => return false,
        };
        let args = runtime_args! { "addr" => addr };
        let call_def = CallDef::new("is_lock_contract", false, args);
        self.env().call_contract(factory, call_def)
    }

    fn registry_vesting_factory(&self) -> Option<Address> {
        let registry = self.require_registry();
        let args = runtime_args! {};
        let call_def = CallDef::new("get_vesting_factory", false, args);
        self.env().call_contract(registry, call_def)
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(CdpError::InsufficientTokenBalance);
        }
        self.balances.set(&from, from_balance - amount);
        let to_balance = self.balance_of(to);
        self.balances.set(&to, to_balance + amount);
    }

    fn require_registry(&self) -> Address {
        match self.registry.get() {
            Some(r) => r,
            None => self.env().revert(CdpError::InvalidConfig),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_year_seconds_matches_365_days() {
        assert_eq!(ONE_YEAR_SECONDS, 31_536_000);
    }
}
