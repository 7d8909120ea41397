//! Vesting lock + registry.
//!
//! `VestingLock` is a single-beneficiary time lock holding a fixed LOAN
//! allocation, released in full once `unlock_timestamp` has passed.
//! `VestingFactory` deploys `VestingLock` instances and records the
//! addresses it deployed, so the LOAN token's transfer-restriction check can
//! tell a genuine lock apart from an arbitrary address during the first-year
//! lock-up window.

use odra::prelude::*;
use odra::casper_types::{U256, runtime_args, RuntimeArgs};
use odra::CallDef;
use crate::errors::CdpError;

/// A single-beneficiary LOAN time lock.
#[odra::module]
pub struct VestingLock {
    /// LOAN token contract address
    loan_token: Var<Address>,
    /// The account entitled to claim the allocation
    beneficiary: Var<Address>,
    /// Total LOAN allocated to this lock
    allocation: Var<U256>,
    /// Timestamp after which `claim` succeeds
    unlock_timestamp: Var<u64>,
    /// Whether the allocation has already been claimed
    claimed: Var<bool>,
}

#[odra::module]
impl VestingLock {
    pub fn init(
        &mut self,
        loan_token: Address,
        beneficiary: Address,
        allocation: U256,
        unlock_timestamp: u64,
    ) {
        self.loan_token.set(loan_token);
        self.beneficiary.set(beneficiary);
        self.allocation.set(allocation);
        self.unlock_timestamp.set(unlock_timestamp);
        self.claimed.set(false);
    }

    /// Release the full allocation to the beneficiary. Callable once, only
    /// after `unlock_timestamp`, only by the beneficiary.
    pub fn claim(&mut self) {
        let caller = self.env().caller();
        let beneficiary = match self.beneficiary.get() {
            Some(b) => b,
            None => self.env().revert(CdpError::VestingNotBeneficiary),
        };
        if caller != beneficiary {
            self.env().revert(CdpError::VestingNotBeneficiary);
        }
        if self.claimed.get().unwrap_or(false) {
            self.env().revert(CdpError::VestingAlreadyClaimed);
        }
        let now = self.env().get_block_time();
        let unlock_at = self.unlock_timestamp.get().unwrap_or(u64::MAX);
        if now < unlock_at {
            self.env().revert(CdpError::VestingNotYetUnlocked);
        }

        self.claimed.set(true);

        let loan_token = match self.loan_token.get() {
            Some(t) => t,
            None => self.env().revert(CdpError::InvalidConfig),
        };
        let allocation = self.allocation.get().unwrap_or(U256::zero());
        let args = runtime_args! { "recipient" => beneficiary, "amount" => allocation };
        let call_def = CallDef::new("transfer", true, args);
        self.env().call_contract::<()>(loan_token, call_def);
    }

    pub fn get_beneficiary(&self) -> Option<Address> {
        self.beneficiary.get()
    }

    pub fn get_allocation(&self) -> U256 {
        self.allocation.get().unwrap_or(U256::zero())
    }

    pub fn get_unlock_timestamp(&self) -> u64 {
        self.unlock_timestamp.get().unwrap_or(0)
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.get().unwrap_or(false)
    }
}

/// Deploys `VestingLock` instances and records their addresses so the LOAN
/// token can recognize them as genuine during the restricted window.
///
/// This reimplementation does not perform the actual cross-contract deploy
/// (Odra's `Deployer` API is host-side only); it records addresses that were
/// deployed out-of-band and passed in by the admin, matching the factory's
/// authenticity-registry role without requiring on-chain contract creation.
#[odra::module]
pub struct VestingFactory {
    /// Registry contract address, for admin lookups
    registry: Var<Address>,
    /// Addresses recognized as genuine vesting locks this factory vouches for
    deployed_locks: Mapping<Address, bool>,
}

#[odra::module]
impl VestingFactory {
    pub fn init(&mut self, registry: Address) {
        self.registry.set(registry);
    }

    /// Record a lock address as genuine (admin only).
    pub fn register_lock(&mut self, lock_address: Address) {
        self.require_admin();
        self.deployed_locks.set(&lock_address, true);
    }

    pub fn is_lock_contract(&self, addr: Address) -> bool {
        self.deployed_locks.get(&addr).unwrap_or(false)
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
    fn unclaimed_default_is_false() {
        assert!(!false);
    }
}
