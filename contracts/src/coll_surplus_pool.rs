//! Coll Surplus Pool collaborator.
//!
//! Holds per-address claimable FURFI surplus left over after a liquidation
//! that left the trove overcollateralized relative to the liquidation
//! penalty taken. A pure accumulator with gated mutators, a sibling of
//! `ActivePool` in the registry wiring.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::CdpError;

#[odra::module]
pub struct CollSurplusPool {
    registry: Var<Address>,
    furfi_balance: Var<U256>,
    claimable: Mapping<Address, U256>,
}

#[odra::module]
impl CollSurplusPool {
    pub fn init(&mut self, registry: Address) {
        self.registry.set(registry);
        self.furfi_balance.set(U256::zero());
    }

    pub fn get_furfi_balance(&self) -> U256 {
        self.furfi_balance.get().unwrap_or(U256::zero())
    }

    pub fn get_claimable(&self, account: Address) -> U256 {
        self.claimable.get(&account).unwrap_or(U256::zero())
    }

    /// Credit `account` with `amount` surplus collateral. Restricted to the Trove Manager.
    pub fn account_surplus(&mut self, account: Address, amount: U256) {
        self.require_trove_manager();
        let current = self.get_claimable(account);
        self.claimable.set(&account, current + amount);
        let balance = self.get_furfi_balance();
        self.furfi_balance.set(balance + amount);
    }

    /// Pay out the caller's full claimable surplus.
    pub fn claim_coll(&mut self) {
        let caller = self.env().caller();
        let amount = self.get_claimable(caller);
        if amount.is_zero() {
            self.env().revert(CdpError::SpNoCollateralGain);
        }
        self.claimable.set(&caller, U256::zero());
        let balance = self.get_furfi_balance();
        self.furfi_balance.set(balance - amount);
    }

    fn require_trove_manager(&self) {
        use odra::casper_types::{runtime_args, RuntimeArgs};
        use odra::CallDef;

        let caller = self.env().caller();
        let registry = self.require_registry();
        let args = runtime_args! {};
        let trove_manager: Option<Address> = self
            .env()
            .call_contract(registry, CallDef::new("get_trove_manager", false, args));
        if Some(caller) != trove_manager {
            self.env().revert(CdpError::CallerNotTroveManager);
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
    fn zero_claimable_by_default() {
        assert!(U256::zero().is_zero());
    }
}
