//! Trove Manager collaborator (thin stub).
//!
//! Trove creation, interest accrual, liquidation *selection* and price
//! oracle logic are explicit non-goals of this crate. This module exists
//! only to give the Stability Pool's two dependencies on it a real shape:
//! it is the sole authorized caller of `offset`, and it exposes the one
//! read the pool needs of the wider system — whether an under-collateralized
//! trove currently exists, which gates non-zero withdrawals.
//!
//! `has_under_collateralized_trove` is a settable flag here rather than a
//! live ICR-sorted-list scan, since that scan is exactly the liquidation-
//! selection logic this crate does not implement.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::CdpError;

#[odra::module]
pub struct TroveManager {
    registry: Var<Address>,
    under_collateralized_trove_exists: Var<bool>,
}

#[odra::module]
impl TroveManager {
    pub fn init(&mut self, registry: Address) {
        self.registry.set(registry);
        self.under_collateralized_trove_exists.set(false);
    }

    pub fn has_under_collateralized_trove(&self) -> bool {
        self.under_collateralized_trove_exists.get().unwrap_or(false)
    }

    /// Test/ops hook standing in for a real ICR-sorted-list scan.
    pub fn set_under_collateralized_trove_exists(&mut self, exists: bool) {
        self.require_admin();
        self.under_collateralized_trove_exists.set(exists);
    }

    /// Liquidate a trove's debt/collateral against the Stability Pool.
    /// Which trove to pick and its ICR computation are explicitly out of
    /// scope; callers supply the amounts directly.
    pub fn offset_via_stability_pool(&mut self, debt_to_offset: U256, coll_to_add: U256) -> U256 {
        self.require_admin();

        use odra::casper_types::{runtime_args, RuntimeArgs};
        use odra::CallDef;
        let registry = self.require_registry();
        let sp_args = runtime_args! {};
        let stability_pool: Option<Address> = self
            .env()
            .call_contract(registry, CallDef::new("get_stability_pool", false, sp_args));
        let stability_pool = match stability_pool {
            Some(sp) => sp,
            None => self.env().revert(CdpError::InvalidConfig),
        };
        let args = runtime_args! { "debt_to_offset" => debt_to_offset, "coll_to_add" => coll_to_add };
        self.env()
            .call_contract(stability_pool, CallDef::new("offset", true, args))
    }

    fn require_admin(&self) {
        use odra::casper_types::{runtime_args, RuntimeArgs};
        use odra::CallDef;

        let caller = self.env().caller();
        let registry = self.require_registry();
        let args = runtime_args! { "caller" => caller };
        let is_admin: bool = self
            .env()
            .call_contract(registry, CallDef::new("is_admin", false, args));
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
    fn default_has_no_under_collateralized_trove() {
        assert!(!false);
    }
}
