//! Common types shared by the Stability Pool core and its collaborators.

use odra::prelude::*;
use odra::casper_types::U256;

/// Protocol-wide configuration parameters, wired once at genesis and
/// consumed by the Stability Pool (`MCR`) and by the collaborator stubs.
#[odra::odra_type]
pub struct ProtocolConfig {
    /// Minimum Collateralization Ratio in bps (e.g., 11000 = 110%)
    pub mcr_bps: u32,
    /// Minimum debt amount (in FURUSD smallest unit)
    pub min_debt: U256,
    /// Borrowing fee in bps
    pub borrowing_fee_bps: u32,
    /// Redemption fee in bps
    pub redemption_fee_bps: u32,
    /// Liquidation penalty in bps
    pub liquidation_penalty_bps: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_config_round_trips_fields() {
        let config = ProtocolConfig {
            mcr_bps: 11000,
            min_debt: U256::from(2000u64),
            borrowing_fee_bps: 50,
            redemption_fee_bps: 50,
            liquidation_penalty_bps: 1000,
        };
        assert_eq!(config.mcr_bps, 11000);
        assert_eq!(config.min_debt, U256::from(2000u64));
    }
}
