//! Deploy contracts to Casper livenet/testnet using Odra livenet environment.
//!
//! Usage:
//!   cd casper && cargo run --bin deploy_livenet --release
//!
//! Requires .env file with:
//!   ODRA_CASPER_LIVENET_SECRET_KEY_PATH=/path/to/secret_key.pem
//!   ODRA_CASPER_LIVENET_NODE_ADDRESS=https://node.testnet.casper.network
//!   ODRA_CASPER_LIVENET_CHAIN_NAME=casper-test
//!   ODRA_CASPER_LIVENET_PAYMENT_AMOUNT=200000000000

use odra::casper_types::U256;
use odra::host::Deployer;
use odra::prelude::*;

use cspr_cdp_contracts::active_pool::{ActivePool, ActivePoolInitArgs};
use cspr_cdp_contracts::borrower_operations::{BorrowerOperations, BorrowerOperationsInitArgs};
use cspr_cdp_contracts::coll_surplus_pool::{CollSurplusPool, CollSurplusPoolInitArgs};
use cspr_cdp_contracts::community_issuance::{CommunityIssuance, CommunityIssuanceInitArgs};
use cspr_cdp_contracts::default_pool::{DefaultPool, DefaultPoolInitArgs};
use cspr_cdp_contracts::furusd::{FurUsd, FurUsdInitArgs};
use cspr_cdp_contracts::loan_token::{LoanToken, LoanTokenInitArgs};
use cspr_cdp_contracts::registry::{Registry, RegistryInitArgs};
use cspr_cdp_contracts::stability_pool::{StabilityPool, StabilityPoolInitArgs};
use cspr_cdp_contracts::trove_manager::{TroveManager, TroveManagerInitArgs};
use cspr_cdp_contracts::vesting::{VestingFactory, VestingFactoryInitArgs};

fn main() {
    // Load environment from .env file
    dotenv::dotenv().ok();

    println!("=== CSPR-CDP Livenet Deployment ===");
    println!();

    // Initialize Odra livenet environment
    let env = odra_casper_livenet_env::env();

    // Configure payment amount for deployments/calls (required for Casper 2.0 txs)
    let payment_amount: u64 = std::env::var("ODRA_CASPER_LIVENET_PAYMENT_AMOUNT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(200_000_000_000);
    env.set_gas(payment_amount);

    // Get deployer address
    let deployer = env.caller();
    println!("Deployer: {:?}", deployer);
    println!();

    // Protocol parameters
    let mcr_bps: u32 = 11000; // 110% MCR
    let min_debt = U256::from(2000u64) * U256::from(10u64).pow(U256::from(18u64)); // 2000 FURUSD
    let borrowing_fee_bps: u32 = 50; // 0.5%
    let redemption_fee_bps: u32 = 50; // 0.5%
    let liquidation_penalty_bps: u32 = 1000; // 10%
    let loan_initial_supply = U256::from(100_000_000u64) * U256::from(10u64).pow(U256::from(18u64));
    let loan_emission_rate = U256::from(10u64).pow(U256::from(18u64)); // 1 LOAN / second

    // ==================== Phase 1: Registry ====================
    println!("=== Phase 1: Deploying Registry ===");
    println!();

    println!("Deploying Registry...");
    let mut registry = Registry::deploy(
        &env,
        RegistryInitArgs {
            admin: deployer.into(),
            mcr_bps,
            min_debt,
            borrowing_fee_bps,
            redemption_fee_bps,
            liquidation_penalty_bps,
        },
    );
    let registry_addr = registry.address().clone();
    println!("Registry deployed at: {:?}", registry_addr);
    println!();

    // ==================== Phase 2: Tokens ====================
    println!("=== Phase 2: Deploying Tokens ===");
    println!();

    println!("Deploying FurUsd...");
    let furusd = FurUsd::deploy(
        &env,
        FurUsdInitArgs {
            registry: registry_addr,
            name: "FURUSD".to_string(),
            symbol: "FURUSD".to_string(),
            decimals: 18,
        },
    );
    let furusd_addr = furusd.address().clone();
    println!("FurUsd deployed at: {:?}", furusd_addr);

    println!("Deploying LoanToken...");
    let loan_token = LoanToken::deploy(
        &env,
        LoanTokenInitArgs {
            registry: registry_addr,
            locked_sender: deployer,
            name: "LOAN".to_string(),
            symbol: "LOAN".to_string(),
            decimals: 18,
            initial_supply: loan_initial_supply,
            initial_holder: deployer,
        },
    );
    let loan_token_addr = loan_token.address().clone();
    println!("LoanToken deployed at: {:?}", loan_token_addr);
    println!();

    // ==================== Phase 3: Collateral / debt accounting ====================
    println!("=== Phase 3: Deploying Pool Collaborators ===");
    println!();

    println!("Deploying ActivePool...");
    let active_pool = ActivePool::deploy(&env, ActivePoolInitArgs { registry: registry_addr });
    let active_pool_addr = active_pool.address().clone();
    println!("ActivePool deployed at: {:?}", active_pool_addr);

    println!("Deploying DefaultPool...");
    let default_pool = DefaultPool::deploy(&env, DefaultPoolInitArgs { registry: registry_addr });
    let default_pool_addr = default_pool.address().clone();
    println!("DefaultPool deployed at: {:?}", default_pool_addr);

    println!("Deploying CollSurplusPool...");
    let coll_surplus_pool =
        CollSurplusPool::deploy(&env, CollSurplusPoolInitArgs { registry: registry_addr });
    let coll_surplus_pool_addr = coll_surplus_pool.address().clone();
    println!("CollSurplusPool deployed at: {:?}", coll_surplus_pool_addr);

    println!("Deploying CommunityIssuance...");
    let community_issuance = CommunityIssuance::deploy(
        &env,
        CommunityIssuanceInitArgs {
            registry: registry_addr,
            loan_token: loan_token_addr,
            emission_rate: loan_emission_rate,
        },
    );
    let community_issuance_addr = community_issuance.address().clone();
    println!("CommunityIssuance deployed at: {:?}", community_issuance_addr);
    println!();

    // ==================== Phase 4: Trove-lifecycle stubs ====================
    println!("=== Phase 4: Deploying Trove-lifecycle Stubs ===");
    println!();

    println!("Deploying BorrowerOperations...");
    let borrower_operations =
        BorrowerOperations::deploy(&env, BorrowerOperationsInitArgs { registry: registry_addr });
    let borrower_operations_addr = borrower_operations.address().clone();
    println!("BorrowerOperations deployed at: {:?}", borrower_operations_addr);

    println!("Deploying TroveManager...");
    let trove_manager = TroveManager::deploy(&env, TroveManagerInitArgs { registry: registry_addr });
    let trove_manager_addr = trove_manager.address().clone();
    println!("TroveManager deployed at: {:?}", trove_manager_addr);

    println!("Deploying VestingFactory...");
    let vesting_factory =
        VestingFactory::deploy(&env, VestingFactoryInitArgs { registry: registry_addr });
    let vesting_factory_addr = vesting_factory.address().clone();
    println!("VestingFactory deployed at: {:?}", vesting_factory_addr);
    println!();

    // ==================== Phase 5: Stability Pool ====================
    println!("=== Phase 5: Deploying Stability Pool ===");
    println!();

    println!("Deploying StabilityPool...");
    let stability_pool =
        StabilityPool::deploy(&env, StabilityPoolInitArgs { registry: registry_addr });
    let stability_pool_addr = stability_pool.address().clone();
    println!("StabilityPool deployed at: {:?}", stability_pool_addr);
    println!();

    // ==================== Phase 6: Cross-contract Configuration ====================
    println!("=== Phase 6: Configuring Registry ===");
    println!();

    registry.set_furusd(furusd_addr);
    registry.set_loan_token(loan_token_addr);
    registry.set_active_pool(active_pool_addr);
    registry.set_default_pool(default_pool_addr);
    registry.set_coll_surplus_pool(coll_surplus_pool_addr);
    registry.set_community_issuance(community_issuance_addr);
    registry.set_borrower_operations(borrower_operations_addr);
    registry.set_trove_manager(trove_manager_addr);
    registry.set_stability_pool(stability_pool_addr);
    registry.set_vesting_factory(vesting_factory_addr);
    println!("Registry wired.");
    println!();

    let mut furusd = furusd;
    furusd.set_stability_pool(stability_pool_addr);
    furusd.add_minter(borrower_operations_addr);
    furusd.add_minter(trove_manager_addr);
    println!("FurUsd wired.");

    println!();
    println!("=== Deployment Complete ===");
    println!();
    println!("Contract Addresses:");
    println!("  Registry:            {:?}", registry_addr);
    println!("  FurUsd:              {:?}", furusd_addr);
    println!("  LoanToken:           {:?}", loan_token_addr);
    println!("  ActivePool:          {:?}", active_pool_addr);
    println!("  DefaultPool:         {:?}", default_pool_addr);
    println!("  CollSurplusPool:     {:?}", coll_surplus_pool_addr);
    println!("  CommunityIssuance:   {:?}", community_issuance_addr);
    println!("  BorrowerOperations:  {:?}", borrower_operations_addr);
    println!("  TroveManager:        {:?}", trove_manager_addr);
    println!("  VestingFactory:      {:?}", vesting_factory_addr);
    println!("  StabilityPool:       {:?}", stability_pool_addr);
}
