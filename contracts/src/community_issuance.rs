//! Community issuance collaborator.
//!
//! Exposes a stateless-to-the-caller `issue_LOAN()` that returns the LOAN
//! minted since the last call, on a linear elapsed-time schedule, and
//! `send_LOAN(to, amount)` to pay out of its own reserved balance. Only the
//! Stability Pool may call either entry point.

use odra::prelude::*;
use odra::casper_types::{U256, runtime_args, RuntimeArgs};
use odra::CallDef;
use crate::errors::CdpError;

#[odra::module]
pub struct CommunityIssuance {
    /// Registry contract address
    registry: Var<Address>,
    /// LOAN token contract address
    loan_token: Var<Address>,
    /// LOAN minted per second
    emission_rate: Var<U256>,
    /// Timestamp of the last `issue_LOAN` call
    last_issuance_timestamp: Var<u64>,
    /// Cumulative LOAN issued so far (informational)
    total_issued: Var<U256>,
    /// Test-only deterministic clock override
    dev_timestamp_override: Var<Option<u64>>,
}

#[odra::module]
impl CommunityIssuance {
    pub fn init(&mut self, registry: Address, loan_token: Address, emission_rate: U256) {
        self.registry.set(registry);
        self.loan_token.set(loan_token);
        self.emission_rate.set(emission_rate);
        self.last_issuance_timestamp.set(self.env().get_block_time());
        self.total_issued.set(U256::zero());
        self.dev_timestamp_override.set(None);
    }

    /// Return the LOAN minted since the last call and advance the clock.
    /// Restricted to the Stability Pool.
    pub fn issue_loan(&mut self) -> U256 {
        self.require_stability_pool();

        let now = self.current_timestamp();
        let last = self.last_issuance_timestamp.get().unwrap_or(now);
        let elapsed = now.saturating_sub(last);
        let rate = self.emission_rate.get().unwrap_or(U256::zero());
        let amount = U256::from(elapsed) * rate;

        self.last_issuance_timestamp.set(now);
        let total = self.total_issued.get().unwrap_or(U256::zero());
        self.total_issued.set(total + amount);

        amount
    }

    /// Pay out previously reserved LOAN. Restricted to the Stability Pool.
    pub fn send_loan(&mut self, to: Address, amount: U256) {
        self.require_stability_pool();
        if amount.is_zero() {
            return;
        }
        let loan_token = self.loan_token.get().unwrap_or(self.env().self_address());
        let args = runtime_args! { "recipient" => to, "amount" => amount };
        let call_def = CallDef::new("transfer", true, args);
        self.env().call_contract::<()>(loan_token, call_def);
    }

    pub fn get_total_issued(&self) -> U256 {
        self.total_issued.get().unwrap_or(U256::zero())
    }

    pub fn get_emission_rate(&self) -> U256 {
        self.emission_rate.get().unwrap_or(U256::zero())
    }

    /// Admin-only: pin the issuance clock for deterministic tests.
    pub fn set_dev_timestamp(&mut self, timestamp: Option<u64>) {
        self.require_admin();
        self.dev_timestamp_override.set(timestamp);
    }

    fn current_timestamp(&self) -> u64 {
        match self.dev_timestamp_override.get().flatten() {
            Some(ts) => ts,
            None => self.env().get_block_time(),
        }
    }

    fn require_stability_pool(&self) {
        let caller = self.env().caller();
        let registry = self.require_registry();
        let args = runtime_args! {};
        let call_def = CallDef::new("get_stability_pool", false, args);
        let stability_pool: Option<Address> = self.env().call_contract(registry, call_def);
        if stability_pool != Some(caller) {
            self.env().revert(CdpError::UnauthorizedProtocol);
        }
    }

    fn require_admin(&self) {
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
    fn linear_emission_is_rate_times_elapsed() {
        let rate = U256::from(5u64);
        let elapsed = 100u64;
        let amount = U256::from(elapsed) * rate;
        assert_eq!(amount, U256::from(500u64));
    }

    #[test]
    fn zero_elapsed_issues_nothing() {
        let rate = U256::from(5u64);
        let elapsed = 0u64;
        let amount = U256::from(elapsed) * rate;
        assert!(amount.is_zero());
    }
}
