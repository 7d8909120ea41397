//! Default Pool collaborator.
//!
//! Tracks FURFI and FURUSD debt that has been redistributed to other troves
//! but not yet applied to any individual trove's accounting. Per the source
//! design note on the two overlapping `DefaultPool` variants (one tracking
//! collateral via an internal counter, the other via a live token balance
//! query), this reimplementation uses the internal-counter model, matching
//! `ActivePool` and resisting forced-send balance poisoning.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::CdpError;

#[odra::module]
pub struct DefaultPool {
    registry: Var<Address>,
    furfi_balance: Var<U256>,
    furusd_debt: Var<U256>,
}

#[odra::module]
impl DefaultPool {
    pub fn init(&mut self, registry: Address) {
        self.registry.set(registry);
        self.furfi_balance.set(U256::zero());
        self.furusd_debt.set(U256::zero());
    }

    pub fn get_furfi_balance(&self) -> U256 {
        self.furfi_balance.get().unwrap_or(U256::zero())
    }

    pub fn get_furusd_debt(&self) -> U256 {
        self.furusd_debt.get().unwrap_or(U256::zero())
    }

    pub fn increase_furusd_debt(&mut self, amount: U256) {
        self.require_trove_manager();
        let debt = self.get_furusd_debt();
        self.furusd_debt.set(debt + amount);
    }

    pub fn decrease_furusd_debt(&mut self, amount: U256) {
        self.require_trove_manager();
        let debt = self.get_furusd_debt();
        if debt < amount {
            self.env().revert(CdpError::SpDebtExceedsDeposits);
        }
        self.furusd_debt.set(debt - amount);
    }

    /// Move collateral out of the internal counter back into the Active Pool.
    pub fn send_furfi_to_active_pool(&mut self, amount: U256) {
        self.require_trove_manager();
        let balance = self.get_furfi_balance();
        if balance < amount {
            self.env().revert(CdpError::InsufficientTokenBalance);
        }
        self.furfi_balance.set(balance - amount);

        use odra::casper_types::{runtime_args, RuntimeArgs};
        use odra::CallDef;
        let registry = self.require_registry();
        let ap_args = runtime_args! {};
        let active_pool: Option<Address> = self
            .env()
            .call_contract(registry, CallDef::new("get_active_pool", false, ap_args));
        if let Some(active_pool) = active_pool {
            let args = runtime_args! { "amount" => amount };
            self.env()
                .call_contract::<()>(active_pool, CallDef::new("receive_furfi", true, args));
        }
    }

    pub fn receive_furfi(&mut self, amount: U256) {
        self.require_trove_manager();
        let balance = self.get_furfi_balance();
        self.furfi_balance.set(balance + amount);
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
    fn starts_at_zero() {
        assert!(U256::zero().is_zero());
    }
}
