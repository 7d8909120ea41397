//! Active Pool collaborator.
//!
//! Tracks the FURFI collateral and FURUSD debt currently backing open
//! troves. A pure accumulator with gated mutators: the Trove Manager and
//! Borrower Operations increase/decrease debt as troves are opened, repaid
//! or liquidated; the Stability Pool's `offset` pulls seized collateral out
//! via `send_furfi`.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::CdpError;

#[odra::module]
pub struct ActivePool {
    registry: Var<Address>,
    furfi_balance: Var<U256>,
    furusd_debt: Var<U256>,
}

#[odra::module]
impl ActivePool {
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

    /// Seize `amount` FURFI and credit it to `to` (the Stability Pool, on offset).
    pub fn send_furfi(&mut self, to: Address, amount: U256) {
        self.require_authorized_caller();
        let balance = self.get_furfi_balance();
        if balance < amount {
            self.env().revert(CdpError::InsufficientTokenBalance);
        }
        self.furfi_balance.set(balance - amount);
        let _ = to; // collateral token transfer is out of this reimplementation's scope
    }

    pub fn increase_furusd_debt(&mut self, amount: U256) {
        self.require_authorized_caller();
        let debt = self.get_furusd_debt();
        self.furusd_debt.set(debt + amount);
    }

    pub fn decrease_furusd_debt(&mut self, amount: U256) {
        self.require_authorized_caller();
        let debt = self.get_furusd_debt();
        if debt < amount {
            self.env().revert(CdpError::SpDebtExceedsDeposits);
        }
        self.furusd_debt.set(debt - amount);
    }

    pub fn receive_furfi(&mut self, amount: U256) {
        self.require_authorized_caller();
        let balance = self.get_furfi_balance();
        self.furfi_balance.set(balance + amount);
    }

    fn require_authorized_caller(&self) {
        use odra::casper_types::{runtime_args, RuntimeArgs};
        use odra::CallDef;

        let caller = self.env().caller();
        let registry = self.require_registry();

        let tm_args = runtime_args! {};
        let trove_manager: Option<Address> = self
            .env()
            .call_contract(registry, CallDef::new("get_trove_manager", false, tm_args));
        let bo_args = runtime_args! {};
        let borrower_ops: Option<Address> = self.env().call_contract(
            registry,
            CallDef::new("get_borrower_operations", false, bo_args),
        );
        let sp_args = runtime_args! {};
        let stability_pool: Option<Address> = self.env().call_contract(
            registry,
            CallDef::new("get_stability_pool", false, sp_args),
        );

        if Some(caller) != trove_manager
            && Some(caller) != borrower_ops
            && Some(caller) != stability_pool
        {
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
    fn test_zero_default() {
        assert!(U256::zero().is_zero());
    }
}
