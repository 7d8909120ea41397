//! Borrower Operations collaborator (thin stub).
//!
//! Trove opening/adjustment is an explicit non-goal. This module exists
//! only to give `withdraw_collateral_gain_to_trove` a real call target:
//! `move_furfi_gain_to_trove` records that the depositor's collateral gain
//! was rerouted into their trove instead of paid out, crediting the active
//! pool's collateral mirror. A full trove-adjustment implementation
//! (interest, ICR recomputation, sorted-list reinsertion) is out of scope.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::CdpError;

#[odra::module]
pub struct BorrowerOperations {
    registry: Var<Address>,
    /// Cumulative FURFI rerouted into troves via the Stability Pool, per depositor
    routed_to_trove: Mapping<Address, U256>,
}

#[odra::module]
impl BorrowerOperations {
    pub fn init(&mut self, registry: Address) {
        self.registry.set(registry);
    }

    pub fn get_routed_to_trove(&self, depositor: Address) -> U256 {
        self.routed_to_trove.get(&depositor).unwrap_or(U256::zero())
    }

    /// Move a depositor's Stability Pool collateral gain into their trove.
    /// Restricted to the Stability Pool.
    pub fn move_furfi_gain_to_trove(
        &mut self,
        depositor: Address,
        amount: U256,
        _upper_hint: Address,
        _lower_hint: Address,
    ) {
        self.require_stability_pool();
        let current = self.get_routed_to_trove(depositor);
        self.routed_to_trove.set(&depositor, current + amount);

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

    fn require_stability_pool(&self) {
        use odra::casper_types::{runtime_args, RuntimeArgs};
        use odra::CallDef;

        let caller = self.env().caller();
        let registry = self.require_registry();
        let args = runtime_args! {};
        let stability_pool: Option<Address> = self
            .env()
            .call_contract(registry, CallDef::new("get_stability_pool", false, args));
        if Some(caller) != stability_pool {
            self.env().revert(CdpError::UnauthorizedProtocol);
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
    fn routed_starts_at_zero() {
        assert!(U256::zero().is_zero());
    }
}
