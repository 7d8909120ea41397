//! FURUSD Stablecoin Contract
//!
//! A CEP-18-style fungible token representing the protocol's debt unit.
//! Holders transfer/approve as usual; the Stability Pool and Trove Manager
//! class contracts move balances through the privileged `send_to_pool`,
//! `return_from_pool`, `burn` and `mint` entry points named in the core's
//! external-interface section.

use odra::prelude::*;
use odra::casper_types::{U256, runtime_args, RuntimeArgs};
use odra::CallDef;
use crate::errors::CdpError;

/// FURUSD stablecoin
#[odra::module]
pub struct FurUsd {
    /// Token name
    name: Var<String>,
    /// Token symbol
    symbol: Var<String>,
    /// Token decimals
    decimals: Var<u8>,
    /// Total supply
    total_supply: Var<U256>,
    /// Account balances
    balances: Mapping<Address, U256>,
    /// Allowances: (owner, spender) -> amount
    allowances: Mapping<(Address, Address), U256>,
    /// Registry contract address (source of admin/role lookups)
    registry: Var<Address>,
    /// Addresses permitted to mint (Borrower Operations, Trove Manager)
    authorized_minters: Mapping<Address, bool>,
    /// The single Stability Pool address permitted to call `send_to_pool`/`return_from_pool`/`burn`
    stability_pool: Var<Option<Address>>,
}

#[odra::module]
impl FurUsd {
    /// Initialize the stablecoin
    pub fn init(&mut self, registry: Address, name: String, symbol: String, decimals: u8) {
        self.registry.set(registry);
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(decimals);
        self.total_supply.set(U256::zero());
        self.stability_pool.set(None);
    }

    // ========== Standard CEP-18 surface ==========

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
        self.move_balance(caller, recipient, amount);
    }

    pub fn approve(&mut self, spender: Address, amount: U256) {
        let caller = self.env().caller();
        self.allowances.set(&(caller, spender), amount);
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        let spender = self.env().caller();
        self.spend_allowance(owner, spender, amount);
        self.move_balance(owner, recipient, amount);
    }

    // ========== Privileged entry points the Stability Pool depends on ==========

    /// Debit `from` and credit the calling pool. Restricted to the registered Stability Pool.
    pub fn send_to_pool(&mut self, from: Address, pool_addr: Address, amount: U256) {
        self.require_stability_pool();
        self.move_balance(from, pool_addr, amount);
    }

    /// Debit the calling pool and credit `to`. Restricted to the registered Stability Pool.
    pub fn return_from_pool(&mut self, pool_addr: Address, to: Address, amount: U256) {
        self.require_stability_pool();
        self.move_balance(pool_addr, to, amount);
    }

    /// Burn `amount` from `pool_addr`'s balance. Restricted to the registered Stability Pool.
    pub fn burn(&mut self, pool_addr: Address, amount: U256) {
        self.require_stability_pool();
        let balance = self.balance_of(pool_addr);
        if balance < amount {
            self.env().revert(CdpError::InsufficientTokenBalance);
        }
        self.balances.set(&pool_addr, balance - amount);
        let supply = self.total_supply();
        self.total_supply.set(supply - amount);
    }

    /// Mint `amount` to `to`. Restricted to authorized minters (Borrower Operations / Trove Manager).
    pub fn mint(&mut self, to: Address, amount: U256) {
        self.require_authorized_minter();
        let balance = self.balance_of(to);
        self.balances.set(&to, balance + amount);
        let supply = self.total_supply();
        self.total_supply.set(supply + amount);
    }

    // ========== Admin wiring ==========

    pub fn set_stability_pool(&mut self, stability_pool: Address) {
        self.require_admin();
        self.stability_pool.set(Some(stability_pool));
    }

    pub fn add_minter(&mut self, minter: Address) {
        self.require_admin();
        self.authorized_minters.set(&minter, true);
    }

    pub fn remove_minter(&mut self, minter: Address) {
        self.require_admin();
        self.authorized_minters.set(&minter, false);
    }

    // ========== Internal ==========

    fn move_balance(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(CdpError::InsufficientTokenBalance);
        }
        self.balances.set(&from, from_balance - amount);
        let to_balance = self.balance_of(to);
        self.balances.set(&to, to_balance + amount);
    }

    fn spend_allowance(&mut self, owner: Address, spender: Address, amount: U256) {
        let current = self.allowance(owner, spender);
        if current < amount {
            self.env().revert(CdpError::InsufficientAllowance);
        }
        self.allowances.set(&(owner, spender), current - amount);
    }

    fn require_stability_pool(&self) {
        let caller = self.env().caller();
        let pool = self.stability_pool.get().flatten();
        if pool != Some(caller) {
            self.env().revert(CdpError::UnauthorizedProtocol);
        }
    }

    fn require_authorized_minter(&self) {
        let caller = self.env().caller();
        if !self.authorized_minters.get(&caller).unwrap_or(false) {
            self.env().revert(CdpError::UnauthorizedProtocol);
        }
    }

    fn require_admin(&self) {
        // Admin ownership is owned by the registry; ask it rather than
        // duplicating the admin address locally.
        let caller = self.env().caller();
        let registry = self.require_registry();
        let args = runtime_args! { "caller" => caller };
        let call_def = CallDef::new("is_admin", false, args);
        let is_admin: bool = self.env().call_contract(registry, call_def);
        if !is_admin {
            self.env().revert(CdpError::Unauthorized);
        }
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
    fn test_decimals_default() {
        assert_eq!(18u8, 18);
    }

    #[test]
    fn test_zero_balance_default() {
        assert_eq!(U256::zero(), U256::from(0u64));
    }
}
