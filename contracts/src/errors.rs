//! Protocol error definitions.

use odra::prelude::*;

/// CDP protocol errors
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CdpError {
    // Trove / collateral-position errors (1xx) -- the core only reads trove
    // status through the Trove Manager collaborator; it never creates or
    // adjusts troves itself.
    NoActiveTrove = 100,
    UnderCollateralizedTroveExists = 101,

    // Access control errors (4xx)
    Unauthorized = 400,
    UnauthorizedProtocol = 401,
    CallerNotTroveManager = 402,

    // Token errors (5xx)
    TokenTransferFailed = 500,
    TokenApprovalFailed = 501,
    InsufficientTokenBalance = 502,
    InsufficientAllowance = 503,
    TransferRestricted = 504,
    UnknownLockContract = 505,

    // Stability pool errors (6xx)
    SpZeroAmount = 600,
    SpFrontEndNotRegistered = 601,
    SpCallerIsFrontEnd = 602,
    SpFrontEndAlreadyRegistered = 603,
    SpKickbackRateOutOfRange = 604,
    SpNoDeposit = 605,
    SpNoCollateralGain = 606,
    SpDebtExceedsDeposits = 607,
    SpProductIsZero = 608,
    SpArithmeticError = 609,
    SpFrontEndHasDeposit = 610,

    // Configuration errors (9xx)
    InvalidConfig = 900,

    // Vesting errors (10xx)
    VestingNotYetUnlocked = 1000,
    VestingAlreadyClaimed = 1001,
    VestingNotBeneficiary = 1002,
}

impl CdpError {
    pub const fn message(&self) -> &'static str {
        match self {
            // Trove
            CdpError::NoActiveTrove => "Caller has no active trove",
            CdpError::UnderCollateralizedTroveExists => {
                "An under-collateralized trove exists; withdrawal blocked"
            }

            // Access control
            CdpError::Unauthorized => "Unauthorized: caller is not admin",
            CdpError::UnauthorizedProtocol => "Unauthorized: caller is not protocol contract",
            CdpError::CallerNotTroveManager => "Unauthorized: caller is not the trove manager",

            // Token
            CdpError::TokenTransferFailed => "Token transfer failed",
            CdpError::TokenApprovalFailed => "Token approval failed",
            CdpError::InsufficientTokenBalance => "Insufficient token balance",
            CdpError::InsufficientAllowance => "Insufficient allowance",
            CdpError::TransferRestricted => "Transfer restricted during lock-up window",
            CdpError::UnknownLockContract => "Recipient is not a registered vesting lock",

            // Stability pool
            CdpError::SpZeroAmount => "Stability pool: amount must be non-zero",
            CdpError::SpFrontEndNotRegistered => "Stability pool: front end is not registered",
            CdpError::SpCallerIsFrontEnd => {
                "Stability pool: caller is a registered front end, cannot deposit"
            }
            CdpError::SpFrontEndAlreadyRegistered => "Stability pool: front end already registered",
            CdpError::SpKickbackRateOutOfRange => "Stability pool: kickback rate exceeds ONE",
            CdpError::SpNoDeposit => "Stability pool: caller has no deposit",
            CdpError::SpNoCollateralGain => "Stability pool: caller has no collateral gain",
            CdpError::SpDebtExceedsDeposits => "Stability pool: debt to offset exceeds total deposits",
            CdpError::SpProductIsZero => "Stability pool: product invariant violated (P == 0)",
            CdpError::SpArithmeticError => "Stability pool: arithmetic invariant violated",
            CdpError::SpFrontEndHasDeposit => {
                "Stability pool: address already holds a deposit, cannot register as a front end"
            }

            // Config
            CdpError::InvalidConfig => "Invalid configuration parameter",

            // Vesting
            CdpError::VestingNotYetUnlocked => "Vesting: unlock time not yet reached",
            CdpError::VestingAlreadyClaimed => "Vesting: already claimed",
            CdpError::VestingNotBeneficiary => "Vesting: caller is not the beneficiary",
        }
    }
}

impl core::fmt::Display for CdpError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<CdpError> for OdraError {
    fn from(error: CdpError) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            OdraError::user(error as u16)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            OdraError::user(error as u16, error.message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(CdpError::SpZeroAmount as u16, 600);
        assert_eq!(CdpError::SpProductIsZero as u16, 608);
        assert_eq!(CdpError::VestingNotYetUnlocked as u16, 1000);
    }

    #[test]
    fn message_is_non_empty_for_every_variant() {
        let variants = [
            CdpError::NoActiveTrove,
            CdpError::UnderCollateralizedTroveExists,
            CdpError::Unauthorized,
            CdpError::UnauthorizedProtocol,
            CdpError::CallerNotTroveManager,
            CdpError::TokenTransferFailed,
            CdpError::TokenApprovalFailed,
            CdpError::InsufficientTokenBalance,
            CdpError::InsufficientAllowance,
            CdpError::TransferRestricted,
            CdpError::UnknownLockContract,
            CdpError::SpZeroAmount,
            CdpError::SpFrontEndNotRegistered,
            CdpError::SpCallerIsFrontEnd,
            CdpError::SpFrontEndAlreadyRegistered,
            CdpError::SpKickbackRateOutOfRange,
            CdpError::SpNoDeposit,
            CdpError::SpNoCollateralGain,
            CdpError::SpDebtExceedsDeposits,
            CdpError::SpProductIsZero,
            CdpError::SpArithmeticError,
            CdpError::SpFrontEndHasDeposit,
            CdpError::InvalidConfig,
            CdpError::VestingNotYetUnlocked,
            CdpError::VestingAlreadyClaimed,
            CdpError::VestingNotBeneficiary,
        ];
        for variant in variants {
            assert!(!variant.message().is_empty());
        }
    }
}
