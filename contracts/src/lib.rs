//! CSPR-CDP Contracts
//!
//! A Liquity-style CDP stablecoin protocol on Casper, built around a
//! Stability Pool that absorbs liquidated debt in O(1) per liquidation via
//! a running product-sum accounting scheme, rather than iterating over
//! depositors.
//!
//! ## Architecture
//!
//! - **Registry**: Wires every collaborator address and protocol config
//! - **FurUsd**: The protocol's debt-unit stablecoin (CEP-18-style)
//! - **LoanToken**: LOAN incentive token, with a first-year transfer
//!   restriction on the admin's own holdings
//! - **StabilityPool**: Absorbs liquidated debt, pays out collateral and
//!   LOAN gains, supports front-end referral tagging
//! - **ActivePool** / **DefaultPool**: Collateral and debt accounting for
//!   open troves and pending-liquidation troves respectively
//! - **CollSurplusPool**: Holds collateral surplus left over after a
//!   liquidation closes a trove above the liquidation price
//! - **CommunityIssuance**: Time-based LOAN emission schedule
//! - **BorrowerOperations** / **TroveManager**: Minimal trove-lifecycle
//!   stubs the Stability Pool calls into (trove management itself is out of
//!   scope for this reimplementation)
//! - **VestingLock** / **VestingFactory**: Beneficiary LOAN time locks and
//!   the registry of genuine locks the LOAN token consults

#![cfg_attr(target_arch = "wasm32", no_std)]

#[cfg(target_arch = "wasm32")]
extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Shared types and errors
pub mod types;
pub mod errors;

// Wiring
pub mod registry;

// Tokens
pub mod furusd;
pub mod loan_token;

// Core liquidation accounting
pub mod stability_pool;

// Collateral/debt accounting collaborators
pub mod active_pool;
pub mod default_pool;
pub mod coll_surplus_pool;
pub mod community_issuance;

// Trove-lifecycle stubs
pub mod borrower_operations;
pub mod trove_manager;

// Vesting
pub mod vesting;
