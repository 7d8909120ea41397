//! Registry contract for wiring collaborator addresses and protocol configuration.
//!
//! Models the "long-lived value with an explicit `new` + `wire(collaborators…)`
//! builder" pattern: every collaborator address is set exactly once by the
//! admin before the first operation, and read by the Stability Pool and its
//! collaborators thereafter.

use odra::prelude::*;
use odra::casper_types::{Key, U256};
use crate::types::ProtocolConfig;
use crate::errors::CdpError;

/// Registry contract for protocol-wide wiring and configuration
#[odra::module]
pub struct Registry {
    /// Protocol admin address
    admin: Var<Address>,
    /// FURUSD stablecoin contract address
    furusd: Var<Option<Address>>,
    /// LOAN incentive token contract address
    loan_token: Var<Option<Address>>,
    /// Active pool contract address
    active_pool: Var<Option<Address>>,
    /// Default pool contract address
    default_pool: Var<Option<Address>>,
    /// Coll surplus pool contract address
    coll_surplus_pool: Var<Option<Address>>,
    /// Community issuance contract address
    community_issuance: Var<Option<Address>>,
    /// Borrower operations contract address
    borrower_operations: Var<Option<Address>>,
    /// Trove manager contract address
    trove_manager: Var<Option<Address>>,
    /// Stability pool contract address
    stability_pool: Var<Option<Address>>,
    /// Vesting factory contract address
    vesting_factory: Var<Option<Address>>,
    /// Protocol configuration
    config: Var<ProtocolConfig>,
}

#[odra::module]
impl Registry {
    /// Initialize the registry with primitive config values.
    /// Uses Key instead of Address to allow deployment via casper-client.
    pub fn init(
        &mut self,
        admin: Key,
        mcr_bps: u32,
        min_debt: U256,
        borrowing_fee_bps: u32,
        redemption_fee_bps: u32,
        liquidation_penalty_bps: u32,
    ) {
        let config = ProtocolConfig {
            mcr_bps,
            min_debt,
            borrowing_fee_bps,
            redemption_fee_bps,
            liquidation_penalty_bps,
        };
        // Convert Key to Address
        let admin_addr = Address::try_from(admin).expect("Invalid admin key");
        self.admin.set(admin_addr);
        self.config.set(config);
    }

    // ========== Wiring (admin only) ==========

    pub fn set_furusd(&mut self, addr: Address) {
        self.require_admin();
        self.furusd.set(Some(addr));
    }

    pub fn set_loan_token(&mut self, addr: Address) {
        self.require_admin();
        self.loan_token.set(Some(addr));
    }

    pub fn set_active_pool(&mut self, addr: Address) {
        self.require_admin();
        self.active_pool.set(Some(addr));
    }

    pub fn set_default_pool(&mut self, addr: Address) {
        self.require_admin();
        self.default_pool.set(Some(addr));
    }

    pub fn set_coll_surplus_pool(&mut self, addr: Address) {
        self.require_admin();
        self.coll_surplus_pool.set(Some(addr));
    }

    pub fn set_community_issuance(&mut self, addr: Address) {
        self.require_admin();
        self.community_issuance.set(Some(addr));
    }

    pub fn set_borrower_operations(&mut self, addr: Address) {
        self.require_admin();
        self.borrower_operations.set(Some(addr));
    }

    pub fn set_trove_manager(&mut self, addr: Address) {
        self.require_admin();
        self.trove_manager.set(Some(addr));
    }

    pub fn set_stability_pool(&mut self, addr: Address) {
        self.require_admin();
        self.stability_pool.set(Some(addr));
    }

    pub fn set_vesting_factory(&mut self, addr: Address) {
        self.require_admin();
        self.vesting_factory.set(Some(addr));
    }

    /// Update protocol configuration (admin only)
    pub fn set_config(&mut self, config: ProtocolConfig) {
        self.require_admin();
        self.config.set(config);
    }

    /// Transfer admin to new address (admin only)
    pub fn transfer_admin(&mut self, new_admin: Address) {
        self.require_admin();
        self.admin.set(new_admin);
    }

    // ========== Views ==========

    pub fn get_admin(&self) -> Option<Address> {
        self.admin.get()
    }

    pub fn get_furusd(&self) -> Option<Address> {
        self.furusd.get().flatten()
    }

    pub fn get_loan_token(&self) -> Option<Address> {
        self.loan_token.get().flatten()
    }

    pub fn get_active_pool(&self) -> Option<Address> {
        self.active_pool.get().flatten()
    }

    pub fn get_default_pool(&self) -> Option<Address> {
        self.default_pool.get().flatten()
    }

    pub fn get_coll_surplus_pool(&self) -> Option<Address> {
        self.coll_surplus_pool.get().flatten()
    }

    pub fn get_community_issuance(&self) -> Option<Address> {
        self.community_issuance.get().flatten()
    }

    pub fn get_borrower_operations(&self) -> Option<Address> {
        self.borrower_operations.get().flatten()
    }

    pub fn get_trove_manager(&self) -> Option<Address> {
        self.trove_manager.get().flatten()
    }

    pub fn get_stability_pool(&self) -> Option<Address> {
        self.stability_pool.get().flatten()
    }

    pub fn get_vesting_factory(&self) -> Option<Address> {
        self.vesting_factory.get().flatten()
    }

    pub fn get_config(&self) -> Option<ProtocolConfig> {
        self.config.get()
    }

    /// Check if caller is admin
    pub fn is_admin(&self, caller: Address) -> bool {
        self.admin.get().map_or(false, |admin| admin == caller)
    }

    fn require_admin(&self) {
        let caller = self.env().caller();
        if !self.is_admin(caller) {
            self.env().revert(CdpError::Unauthorized);
        }
    }
}

/// Default protocol configuration
pub fn default_protocol_config() -> ProtocolConfig {
    ProtocolConfig {
        mcr_bps: 11000,
        min_debt: U256::from(1) * U256::from(10).pow(U256::from(18)),
        borrowing_fee_bps: 50,
        redemption_fee_bps: 50,
        liquidation_penalty_bps: 1000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_mcr() {
        let config = default_protocol_config();
        assert_eq!(config.mcr_bps, 11000);
    }

    #[test]
    fn test_default_config_min_debt() {
        let config = default_protocol_config();
        assert_eq!(config.min_debt, U256::from(10).pow(U256::from(18)));
    }
}
