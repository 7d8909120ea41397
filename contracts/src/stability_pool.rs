//! Stability Pool Contract
//!
//! Holds pooled FURUSD deposits that absorb liquidated debt. In return,
//! depositors earn a share of the seized FURFI collateral and of the LOAN
//! issuance stream, both accrued without iterating over depositors on every
//! liquidation: a running product `P` and per-`(epoch, scale)` running sums
//! `S` (collateral) and `G` (LOAN) let any depositor's gain and compounded
//! balance be derived in O(1) from a snapshot taken at their last touch.
//!
//! Front ends may register once, immutably, with a kickback rate; deposits
//! tagged to a front end split their LOAN gain between depositor and front
//! end according to that rate, with the front end's aggregate tagged stake
//! tracked through the same product-sum mechanism (its own snapshot, no `S`
//! component since front ends never receive a collateral gain directly).

use odra::prelude::*;
use odra::casper_types::{U256, runtime_args, RuntimeArgs};
use odra::CallDef;
use crate::errors::CdpError;

/// Precision scale for product-sum calculations (1e18).
const SCALE: u64 = 1_000_000_000_000_000_000;

/// Scale factor for the product-sum algorithm (1e9). `P` is renormalized by
/// this factor whenever it would otherwise underflow precision.
const SCALE_FACTOR: u64 = 1_000_000_000;

fn one() -> U256 {
    U256::from(SCALE)
}

fn scale_factor() -> U256 {
    U256::from(SCALE_FACTOR)
}

/// A depositor's principal and the front end it is tagged to, if any.
#[odra::odra_type]
#[derive(Default)]
pub struct Deposit {
    pub initial_value: U256,
    pub front_end_tag: Option<Address>,
}

/// Snapshot of the global accumulators taken at a deposit's last touch.
#[odra::odra_type]
#[derive(Default)]
pub struct DepositSnapshot {
    pub p: U256,
    pub s: U256,
    pub g: U256,
    pub scale: u128,
    pub epoch: u128,
}

/// A registered front end and its immutable kickback rate.
#[odra::odra_type]
#[derive(Default)]
pub struct FrontEnd {
    pub kickback_rate: U256,
    pub registered: bool,
}

/// Snapshot of the global accumulators taken at a front end's last touch.
/// No `s` field: front ends never receive a collateral gain of their own.
#[odra::odra_type]
#[derive(Default)]
pub struct FrontEndSnapshot {
    pub p: U256,
    pub g: U256,
    pub scale: u128,
    pub epoch: u128,
}

/// Stability Pool Contract
#[odra::module]
pub struct StabilityPool {
    /// Registry contract address, for resolving every collaborator by name
    registry: Var<Address>,

    // === Product-sum accumulators ===
    p: Var<U256>,
    current_scale: Var<u128>,
    current_epoch: Var<u128>,
    epoch_to_scale_to_s: Mapping<(u128, u128), U256>,
    epoch_to_scale_to_g: Mapping<(u128, u128), U256>,

    // === Pool totals ===
    total_furusd_deposits: Var<U256>,
    furfi_balance: Var<U256>,
    depositor_count: Var<u64>,

    // === Feedback error correction ===
    last_loan_error: Var<U256>,
    last_furfi_error_offset: Var<U256>,
    last_furusd_loss_error_offset: Var<U256>,

    // === Depositor state ===
    deposits: Mapping<Address, Deposit>,
    deposit_snapshots: Mapping<Address, DepositSnapshot>,
    claimable_furfi: Mapping<Address, U256>,

    // === Front-end state ===
    front_ends: Mapping<Address, FrontEnd>,
    front_end_stakes: Mapping<Address, U256>,
    front_end_snapshots: Mapping<Address, FrontEndSnapshot>,
}

#[odra::module]
impl StabilityPool {
    /// Initialize the pool. `P` starts at `ONE`, `scale`/`epoch` at 0.
    pub fn init(&mut self, registry: Address) {
        self.registry.set(registry);
        self.p.set(one());
        self.current_scale.set(0u128);
        self.current_epoch.set(0u128);
        self.total_furusd_deposits.set(U256::zero());
        self.furfi_balance.set(U256::zero());
        self.depositor_count.set(0u64);
        self.last_loan_error.set(U256::zero());
        self.last_furfi_error_offset.set(U256::zero());
        self.last_furusd_loss_error_offset.set(U256::zero());
    }

    // ================= Depositor-facing operations =================

    /// Deposit `amount` FURUSD, optionally tagged to a front end.
    pub fn provide_to_stability_pool(&mut self, amount: U256, front_end_tag: Option<Address>) {
        if amount.is_zero() {
            self.env().revert(CdpError::SpZeroAmount);
        }
        let caller = self.env().caller();
        if self.is_front_end_registered(caller) {
            self.env().revert(CdpError::SpCallerIsFrontEnd);
        }
        if let Some(tag) = front_end_tag {
            if !self.is_front_end_registered(tag) {
                self.env().revert(CdpError::SpFrontEndNotRegistered);
            }
        }

        self.trigger_loan_issuance();

        let existing = self.deposits.get(&caller).unwrap_or_default();
        let existing_snapshot = self.deposit_snapshots.get(&caller).unwrap_or_default();
        let is_new_depositor = existing.initial_value.is_zero();
        let effective_tag = if is_new_depositor {
            front_end_tag
        } else {
            existing.front_end_tag
        };

        let compounded_existing = self.compounded_stake(
            existing.initial_value,
            existing_snapshot.p,
            existing_snapshot.epoch,
            existing_snapshot.scale,
        );
        let furfi_gain = self.collateral_gain_raw(existing.initial_value, &existing_snapshot);
        let depositor_loan_raw = self.loan_gain_raw(
            existing.initial_value,
            existing_snapshot.p,
            existing_snapshot.g,
            existing_snapshot.epoch,
            existing_snapshot.scale,
        );

        self.pay_loan_gains(caller, effective_tag, depositor_loan_raw);

        if let Some(tag) = effective_tag {
            let compounded_fe_stake = self.get_compounded_front_end_stake(tag);
            self.bump_front_end_stake(tag, compounded_fe_stake, amount, true);
        }

        self.call_send_to_pool(caller, amount);
        let total = self.total_furusd_deposits.get().unwrap_or_default();
        self.total_furusd_deposits.set(total + amount);

        if is_new_depositor {
            let count = self.depositor_count.get().unwrap_or(0);
            self.depositor_count.set(count + 1);
        }

        let new_deposit_value = compounded_existing + amount;
        self.store_deposit(caller, new_deposit_value, effective_tag);

        if !furfi_gain.is_zero() {
            self.pay_collateral_gain(caller, furfi_gain);
        }
    }

    /// Withdraw up to `amount` FURUSD (capped at the compounded deposit).
    /// A zero-amount call is allowed and only harvests gains.
    pub fn withdraw_from_stability_pool(&mut self, amount: U256) {
        let caller = self.env().caller();
        let existing = self.deposits.get(&caller).unwrap_or_default();
        if existing.initial_value.is_zero() {
            self.env().revert(CdpError::SpNoDeposit);
        }
        if !amount.is_zero() && self.has_under_collateralized_trove() {
            self.env().revert(CdpError::UnderCollateralizedTroveExists);
        }

        self.trigger_loan_issuance();

        let existing_snapshot = self.deposit_snapshots.get(&caller).unwrap_or_default();
        let tag = existing.front_end_tag;

        let compounded_existing = self.compounded_stake(
            existing.initial_value,
            existing_snapshot.p,
            existing_snapshot.epoch,
            existing_snapshot.scale,
        );
        let furfi_gain = self.collateral_gain_raw(existing.initial_value, &existing_snapshot);
        let depositor_loan_raw = self.loan_gain_raw(
            existing.initial_value,
            existing_snapshot.p,
            existing_snapshot.g,
            existing_snapshot.epoch,
            existing_snapshot.scale,
        );

        self.pay_loan_gains(caller, tag, depositor_loan_raw);

        let withdrawal = if amount > compounded_existing {
            compounded_existing
        } else {
            amount
        };

        if let Some(front_end) = tag {
            let compounded_fe_stake = self.get_compounded_front_end_stake(front_end);
            self.bump_front_end_stake(front_end, compounded_fe_stake, withdrawal, false);
        }

        if !withdrawal.is_zero() {
            self.call_return_from_pool(caller, withdrawal);
            let total = self.total_furusd_deposits.get().unwrap_or_default();
            self.total_furusd_deposits.set(total - withdrawal);
        }

        let new_deposit_value = compounded_existing - withdrawal;
        if new_deposit_value.is_zero() {
            let count = self.depositor_count.get().unwrap_or(0);
            self.depositor_count.set(count.saturating_sub(1));
        }
        self.store_deposit(caller, new_deposit_value, tag);

        if !furfi_gain.is_zero() {
            self.pay_collateral_gain(caller, furfi_gain);
        }
    }

    /// Reroute the caller's collateral gain into their trove via Borrower
    /// Operations instead of paying it out directly. The deposit principal
    /// is left untouched (only its snapshot is refreshed).
    pub fn withdraw_collateral_gain_to_trove(&mut self, upper_hint: Address, lower_hint: Address) {
        let caller = self.env().caller();
        let existing = self.deposits.get(&caller).unwrap_or_default();
        if existing.initial_value.is_zero() {
            self.env().revert(CdpError::SpNoDeposit);
        }

        self.trigger_loan_issuance();

        let existing_snapshot = self.deposit_snapshots.get(&caller).unwrap_or_default();
        let tag = existing.front_end_tag;

        let compounded_existing = self.compounded_stake(
            existing.initial_value,
            existing_snapshot.p,
            existing_snapshot.epoch,
            existing_snapshot.scale,
        );
        let furfi_gain = self.collateral_gain_raw(existing.initial_value, &existing_snapshot);
        if furfi_gain.is_zero() {
            self.env().revert(CdpError::SpNoCollateralGain);
        }
        let depositor_loan_raw = self.loan_gain_raw(
            existing.initial_value,
            existing_snapshot.p,
            existing_snapshot.g,
            existing_snapshot.epoch,
            existing_snapshot.scale,
        );

        self.pay_loan_gains(caller, tag, depositor_loan_raw);

        if let Some(front_end) = tag {
            let compounded_fe_stake = self.get_compounded_front_end_stake(front_end);
            self.bump_front_end_stake(front_end, compounded_fe_stake, U256::zero(), true);
        }

        self.store_deposit(caller, compounded_existing, tag);

        let balance = self.furfi_balance.get().unwrap_or_default();
        self.furfi_balance.set(balance - furfi_gain);
        self.call_move_furfi_gain_to_trove(caller, furfi_gain, upper_hint, lower_hint);
    }

    /// Pay out the caller's full claimable FURFI collateral gain, credited
    /// by prior `provide`/`withdraw` calls via `pay_collateral_gain`.
    pub fn claim_collateral_gain(&mut self) {
        let caller = self.env().caller();
        let amount = self.claimable_furfi.get(&caller).unwrap_or_default();
        if amount.is_zero() {
            self.env().revert(CdpError::SpNoCollateralGain);
        }
        self.claimable_furfi.set(&caller, U256::zero());
    }

    /// Register the caller as a front end with a fixed, immutable kickback
    /// rate. The caller must hold no deposit and must not already be one.
    pub fn register_front_end(&mut self, kickback_rate: U256) {
        let caller = self.env().caller();
        if kickback_rate > one() {
            self.env().revert(CdpError::SpKickbackRateOutOfRange);
        }
        if self.is_front_end_registered(caller) {
            self.env().revert(CdpError::SpFrontEndAlreadyRegistered);
        }
        let existing = self.deposits.get(&caller).unwrap_or_default();
        if !existing.initial_value.is_zero() {
            self.env().revert(CdpError::SpFrontEndHasDeposit);
        }
        self.front_ends.set(
            &caller,
            FrontEnd {
                kickback_rate,
                registered: true,
            },
        );
    }

    // ================= Trove Manager -> Pool =================

    /// Cancel `debt_to_offset` FURUSD against pooled deposits, crediting
    /// `coll_to_add` FURFI proportionally. Callable only by the Trove
    /// Manager, during a liquidation.
    pub fn offset(&mut self, debt_to_offset: U256, coll_to_add: U256) -> U256 {
        self.require_trove_manager();

        let total = self.total_furusd_deposits.get().unwrap_or_default();
        if total.is_zero() || debt_to_offset.is_zero() {
            return U256::zero();
        }
        if debt_to_offset > total {
            self.env().revert(CdpError::SpDebtExceedsDeposits);
        }

        self.trigger_loan_issuance();

        let (furfi_gain_per_unit, furusd_loss_per_unit) =
            self.compute_rewards_per_unit_staked(coll_to_add, debt_to_offset, total);
        self.update_reward_sum_and_product(furfi_gain_per_unit, furusd_loss_per_unit);

        self.call_decrease_furusd_debt(debt_to_offset);
        let new_total = total - debt_to_offset;
        self.total_furusd_deposits.set(new_total);

        self.call_burn(debt_to_offset);
        self.call_pull_furfi(coll_to_add);

        let balance = self.furfi_balance.get().unwrap_or_default();
        self.furfi_balance.set(balance + coll_to_add);

        debt_to_offset
    }

    // ================= Views =================

    pub fn get_furfi_balance(&self) -> U256 {
        self.furfi_balance.get().unwrap_or_default()
    }

    pub fn get_total_furusd_deposits(&self) -> U256 {
        self.total_furusd_deposits.get().unwrap_or_default()
    }

    pub fn get_p(&self) -> U256 {
        self.p.get().unwrap_or_else(one)
    }

    pub fn get_current_scale(&self) -> u128 {
        self.current_scale.get().unwrap_or(0)
    }

    pub fn get_current_epoch(&self) -> u128 {
        self.current_epoch.get().unwrap_or(0)
    }

    pub fn get_depositor_count(&self) -> u64 {
        self.depositor_count.get().unwrap_or(0)
    }

    pub fn get_deposit(&self, depositor: Address) -> U256 {
        self.deposits.get(&depositor).unwrap_or_default().initial_value
    }

    pub fn get_compounded_deposit(&self, depositor: Address) -> U256 {
        let deposit = self.deposits.get(&depositor).unwrap_or_default();
        let snap = self.deposit_snapshots.get(&depositor).unwrap_or_default();
        self.compounded_stake(deposit.initial_value, snap.p, snap.epoch, snap.scale)
    }

    pub fn get_compounded_front_end_stake(&self, front_end: Address) -> U256 {
        let stake = self.front_end_stakes.get(&front_end).unwrap_or_default();
        let snap = self.front_end_snapshots.get(&front_end).unwrap_or_default();
        self.compounded_stake(stake, snap.p, snap.epoch, snap.scale)
    }

    pub fn get_depositor_collateral_gain(&self, depositor: Address) -> U256 {
        let deposit = self.deposits.get(&depositor).unwrap_or_default();
        let snap = self.deposit_snapshots.get(&depositor).unwrap_or_default();
        self.collateral_gain_raw(deposit.initial_value, &snap)
    }

    /// FURFI already paid out by a prior `provide`/`withdraw` and waiting on
    /// `claim_collateral_gain`, as opposed to the unrealized gain above.
    pub fn get_claimable_furfi(&self, depositor: Address) -> U256 {
        self.claimable_furfi.get(&depositor).unwrap_or_default()
    }

    pub fn get_depositor_loan_gain(&self, depositor: Address) -> U256 {
        let deposit = self.deposits.get(&depositor).unwrap_or_default();
        let snap = self.deposit_snapshots.get(&depositor).unwrap_or_default();
        let raw = self.loan_gain_raw(deposit.initial_value, snap.p, snap.g, snap.epoch, snap.scale);
        match deposit.front_end_tag {
            Some(tag) => {
                let kickback_rate = self.kickback_rate_of(tag);
                raw * kickback_rate / one()
            }
            None => raw,
        }
    }

    pub fn get_front_end_loan_gain(&self, front_end: Address) -> U256 {
        let kickback_rate = self.kickback_rate_of(front_end);
        let stake = self.front_end_stakes.get(&front_end).unwrap_or_default();
        let snap = self.front_end_snapshots.get(&front_end).unwrap_or_default();
        let raw = self.loan_gain_raw(stake, snap.p, snap.g, snap.epoch, snap.scale);
        let front_end_share = self.checked_sub_u256(one(), kickback_rate);
        raw * front_end_share / one()
    }

    pub fn is_registered_front_end(&self, addr: Address) -> bool {
        self.is_front_end_registered(addr)
    }

    pub fn get_front_end_kickback_rate(&self, front_end: Address) -> U256 {
        self.kickback_rate_of(front_end)
    }

    // ================= Internal: product-sum math =================

    /// Compounded value of a stake of `initial_value` last snapshotted at
    /// `(snap_p, snap_epoch, snap_scale)`. Zero once the snapshot's epoch is
    /// stale, or once two or more scale boundaries have passed untouched.
    fn compounded_stake(
        &self,
        initial_value: U256,
        snap_p: U256,
        snap_epoch: u128,
        snap_scale: u128,
    ) -> U256 {
        if initial_value.is_zero() || snap_p.is_zero() {
            return U256::zero();
        }
        let current_epoch = self.current_epoch.get().unwrap_or(0);
        if snap_epoch != current_epoch {
            return U256::zero();
        }
        let current_scale = self.current_scale.get().unwrap_or(0);
        let current_p = self.p.get().unwrap_or_else(one);
        match current_scale.saturating_sub(snap_scale) {
            0 => initial_value * current_p / snap_p,
            1 => initial_value * current_p / snap_p / scale_factor(),
            _ => U256::zero(),
        }
    }

    fn collateral_gain_raw(&self, initial_value: U256, snap: &DepositSnapshot) -> U256 {
        if initial_value.is_zero() || snap.p.is_zero() {
            return U256::zero();
        }
        let current_epoch = self.current_epoch.get().unwrap_or(0);
        if snap.epoch != current_epoch {
            return U256::zero();
        }
        let current_cell = self
            .epoch_to_scale_to_s
            .get(&(snap.epoch, snap.scale))
            .unwrap_or_default();
        let next_cell = self
            .epoch_to_scale_to_s
            .get(&(snap.epoch, snap.scale + 1))
            .unwrap_or_default();
        let first_portion = current_cell.saturating_sub(snap.s);
        let second_portion = next_cell / scale_factor();
        initial_value * (first_portion + second_portion) / snap.p / one()
    }

    fn loan_gain_raw(
        &self,
        initial_value: U256,
        snap_p: U256,
        snap_g: U256,
        snap_epoch: u128,
        snap_scale: u128,
    ) -> U256 {
        if initial_value.is_zero() || snap_p.is_zero() {
            return U256::zero();
        }
        let current_epoch = self.current_epoch.get().unwrap_or(0);
        if snap_epoch != current_epoch {
            return U256::zero();
        }
        let current_cell = self
            .epoch_to_scale_to_g
            .get(&(snap_epoch, snap_scale))
            .unwrap_or_default();
        let next_cell = self
            .epoch_to_scale_to_g
            .get(&(snap_epoch, snap_scale + 1))
            .unwrap_or_default();
        let first_portion = current_cell.saturating_sub(snap_g);
        let second_portion = next_cell / scale_factor();
        initial_value * (first_portion + second_portion) / snap_p / one()
    }

    /// Feedback-corrected per-unit FURFI gain and FURUSD loss for an offset.
    fn compute_rewards_per_unit_staked(
        &mut self,
        coll_to_add: U256,
        debt_to_offset: U256,
        total: U256,
    ) -> (U256, U256) {
        let last_furfi_error = self.last_furfi_error_offset.get().unwrap_or_default();
        let furfi_numerator = coll_to_add * one() + last_furfi_error;
        let furfi_gain_per_unit = furfi_numerator / total;
        let new_furfi_error = furfi_numerator - furfi_gain_per_unit * total;
        self.last_furfi_error_offset.set(new_furfi_error);

        let furusd_loss_per_unit = if debt_to_offset == total {
            self.last_furusd_loss_error_offset.set(U256::zero());
            one()
        } else {
            let last_loss_error = self.last_furusd_loss_error_offset.get().unwrap_or_default();
            let loss_numerator = self.checked_sub_u256(debt_to_offset * one(), last_loss_error);
            let per_unit = loss_numerator / total + U256::one();
            let new_error = per_unit * total - loss_numerator;
            self.last_furusd_loss_error_offset.set(new_error);
            per_unit
        };

        (furfi_gain_per_unit, furusd_loss_per_unit)
    }

    /// Fold the per-unit rewards into `S` and into `P` (with its
    /// scale/epoch bookkeeping), per the scale-and-epoch rules of §4.1.
    fn update_reward_sum_and_product(&mut self, furfi_gain_per_unit: U256, furusd_loss_per_unit: U256) {
        let p = self.p.get().unwrap_or_else(one);
        let epoch = self.current_epoch.get().unwrap_or(0);
        let scale = self.current_scale.get().unwrap_or(0);

        let marginal_furfi_gain = furfi_gain_per_unit * p;
        let current_s = self.epoch_to_scale_to_s.get(&(epoch, scale)).unwrap_or_default();
        self.epoch_to_scale_to_s
            .set(&(epoch, scale), current_s + marginal_furfi_gain);

        let new_product_factor = self.checked_sub_u256(one(), furusd_loss_per_unit);

        if new_product_factor.is_zero() {
            self.current_epoch.set(epoch + 1);
            self.current_scale.set(0u128);
            self.p.set(one());
            self.last_furusd_loss_error_offset.set(U256::zero());
            return;
        }

        let new_p_unscaled = p * new_product_factor / one();
        if new_p_unscaled < scale_factor() {
            self.p.set(new_p_unscaled * scale_factor());
            self.current_scale.set(scale + 1);
        } else {
            self.p.set(new_p_unscaled);
        }

        if self.p.get().unwrap_or_default().is_zero() {
            self.env().revert(CdpError::SpProductIsZero);
        }
    }

    fn update_g(&mut self, issuance: U256) {
        let total = self.total_furusd_deposits.get().unwrap_or_default();
        if total.is_zero() || issuance.is_zero() {
            return;
        }
        let p = self.p.get().unwrap_or_else(one);
        let last_error = self.last_loan_error.get().unwrap_or_default();
        let numerator = issuance * one() + last_error;
        let per_unit = numerator / total;
        let new_error = numerator - per_unit * total;
        self.last_loan_error.set(new_error);

        let marginal = per_unit * p;
        let epoch = self.current_epoch.get().unwrap_or(0);
        let scale = self.current_scale.get().unwrap_or(0);
        let current = self.epoch_to_scale_to_g.get(&(epoch, scale)).unwrap_or_default();
        self.epoch_to_scale_to_g.set(&(epoch, scale), current + marginal);
    }

    fn checked_sub_u256(&self, a: U256, b: U256) -> U256 {
        match a.checked_sub(b) {
            Some(v) => v,
            None => self.env().revert(CdpError::SpArithmeticError),
        }
    }

    // ================= Internal: deposit / front-end bookkeeping =================

    fn store_deposit(&mut self, depositor: Address, new_value: U256, tag: Option<Address>) {
        if new_value.is_zero() {
            self.deposits.set(&depositor, Deposit::default());
            self.deposit_snapshots.set(&depositor, DepositSnapshot::default());
            return;
        }
        self.deposits.set(
            &depositor,
            Deposit {
                initial_value: new_value,
                front_end_tag: tag,
            },
        );
        let epoch = self.current_epoch.get().unwrap_or(0);
        let scale = self.current_scale.get().unwrap_or(0);
        let snap = DepositSnapshot {
            p: self.p.get().unwrap_or_else(one),
            s: self.epoch_to_scale_to_s.get(&(epoch, scale)).unwrap_or_default(),
            g: self.epoch_to_scale_to_g.get(&(epoch, scale)).unwrap_or_default(),
            scale,
            epoch,
        };
        self.deposit_snapshots.set(&depositor, snap);
    }

    fn bump_front_end_stake(
        &mut self,
        front_end: Address,
        compounded_existing_stake: U256,
        delta: U256,
        increase: bool,
    ) {
        let new_stake = if increase {
            compounded_existing_stake + delta
        } else {
            compounded_existing_stake.saturating_sub(delta)
        };
        self.front_end_stakes.set(&front_end, new_stake);
        let epoch = self.current_epoch.get().unwrap_or(0);
        let scale = self.current_scale.get().unwrap_or(0);
        let snap = FrontEndSnapshot {
            p: self.p.get().unwrap_or_else(one),
            g: self.epoch_to_scale_to_g.get(&(epoch, scale)).unwrap_or_default(),
            scale,
            epoch,
        };
        self.front_end_snapshots.set(&front_end, snap);
    }

    fn is_front_end_registered(&self, addr: Address) -> bool {
        self.front_ends.get(&addr).map(|fe| fe.registered).unwrap_or(false)
    }

    fn kickback_rate_of(&self, front_end: Address) -> U256 {
        self.front_ends
            .get(&front_end)
            .map(|fe| fe.kickback_rate)
            .unwrap_or_else(one)
    }

    /// Pay out LOAN gains: the depositor's kickback share directly, and the
    /// tagged front end's share computed from the front end's own stake and
    /// snapshot (not derived from the depositor's raw gain).
    fn pay_loan_gains(&mut self, depositor: Address, tag: Option<Address>, depositor_raw_gain: U256) {
        match tag {
            Some(front_end) => {
                let kickback_rate = self.kickback_rate_of(front_end);
                let depositor_share = depositor_raw_gain * kickback_rate / one();
                self.call_send_loan(depositor, depositor_share);

                let stake = self.front_end_stakes.get(&front_end).unwrap_or_default();
                let snap = self.front_end_snapshots.get(&front_end).unwrap_or_default();
                let fe_raw_gain = self.loan_gain_raw(stake, snap.p, snap.g, snap.epoch, snap.scale);
                let front_end_share = self.checked_sub_u256(one(), kickback_rate);
                let fe_share = fe_raw_gain * front_end_share / one();
                self.call_send_loan(front_end, fe_share);
            }
            None => {
                self.call_send_loan(depositor, depositor_raw_gain);
            }
        }
    }

    fn pay_collateral_gain(&mut self, to: Address, amount: U256) {
        let balance = self.furfi_balance.get().unwrap_or_default();
        self.furfi_balance.set(balance - amount);
        let claimable = self.claimable_furfi.get(&to).unwrap_or_default();
        self.claimable_furfi.set(&to, claimable + amount);
    }

    fn trigger_loan_issuance(&mut self) {
        let community_issuance = self.collaborator_address("get_community_issuance");
        let args = runtime_args! {};
        let issuance: U256 = self
            .env()
            .call_contract(community_issuance, CallDef::new("issue_loan", true, args));
        self.update_g(issuance);
    }

    fn has_under_collateralized_trove(&self) -> bool {
        let trove_manager = self.collaborator_address("get_trove_manager");
        let args = runtime_args! {};
        self.env().call_contract(
            trove_manager,
            CallDef::new("has_under_collateralized_trove", false, args),
        )
    }

    // ================= Internal: collaborator calls =================

    fn call_send_to_pool(&self, from: Address, amount: U256) {
        let furusd = self.collaborator_address("get_furusd");
        let pool_addr = self.env().self_address();
        let args = runtime_args! { "from" => from, "pool_addr" => pool_addr, "amount" => amount };
        self.env()
            .call_contract::<()>(furusd, CallDef::new("send_to_pool", true, args));
    }

    fn call_return_from_pool(&self, to: Address, amount: U256) {
        if amount.is_zero() {
            return;
        }
        let furusd = self.collaborator_address("get_furusd");
        let pool_addr = self.env().self_address();
        let args = runtime_args! { "pool_addr" => pool_addr, "to" => to, "amount" => amount };
        self.env()
            .call_contract::<()>(furusd, CallDef::new("return_from_pool", true, args));
    }

    fn call_burn(&self, amount: U256) {
        let furusd = self.collaborator_address("get_furusd");
        let pool_addr = self.env().self_address();
        let args = runtime_args! { "pool_addr" => pool_addr, "amount" => amount };
        self.env()
            .call_contract::<()>(furusd, CallDef::new("burn", true, args));
    }

    fn call_pull_furfi(&self, amount: U256) {
        if amount.is_zero() {
            return;
        }
        let active_pool = self.collaborator_address("get_active_pool");
        let pool_addr = self.env().self_address();
        let args = runtime_args! { "to" => pool_addr, "amount" => amount };
        self.env()
            .call_contract::<()>(active_pool, CallDef::new("send_furfi", true, args));
    }

    fn call_decrease_furusd_debt(&self, amount: U256) {
        let active_pool = self.collaborator_address("get_active_pool");
        let args = runtime_args! { "amount" => amount };
        self.env()
            .call_contract::<()>(active_pool, CallDef::new("decrease_furusd_debt", true, args));
    }

    fn call_send_loan(&self, to: Address, amount: U256) {
        if amount.is_zero() {
            return;
        }
        let community_issuance = self.collaborator_address("get_community_issuance");
        let args = runtime_args! { "to" => to, "amount" => amount };
        self.env()
            .call_contract::<()>(community_issuance, CallDef::new("send_loan", true, args));
    }

    fn call_move_furfi_gain_to_trove(
        &self,
        depositor: Address,
        amount: U256,
        upper_hint: Address,
        lower_hint: Address,
    ) {
        let borrower_operations = self.collaborator_address("get_borrower_operations");
        let args = runtime_args! {
            "depositor" => depositor,
            "amount" => amount,
            "_upper_hint" => upper_hint,
            "_lower_hint" => lower_hint
        };
        self.env().call_contract::<()>(
            borrower_operations,
            CallDef::new("move_furfi_gain_to_trove", true, args),
        );
    }

    fn require_trove_manager(&self) {
        let caller = self.env().caller();
        let trove_manager = self.collaborator_address("get_trove_manager");
        if caller != trove_manager {
            self.env().revert(CdpError::CallerNotTroveManager);
        }
    }

    fn collaborator_address(&self, entry_point: &str) -> Address {
        let registry = self.require_registry();
        let args = runtime_args! {};
        let result: Option<Address> = self
            .env()
            .call_contract(registry, CallDef::new(entry_point, false, args));
        match result {
            Some(addr) => addr,
            None => self.env().revert(CdpError::InvalidConfig),
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
    fn test_scale_constants() {
        assert_eq!(SCALE, 1_000_000_000_000_000_000);
        assert_eq!(SCALE_FACTOR, 1_000_000_000);
    }

    #[test]
    fn test_deposit_snapshot_default() {
        let snapshot = DepositSnapshot::default();
        assert!(snapshot.p.is_zero());
        assert!(snapshot.s.is_zero());
        assert!(snapshot.g.is_zero());
        assert_eq!(snapshot.epoch, 0);
        assert_eq!(snapshot.scale, 0);
    }

    #[test]
    fn test_front_end_default_not_registered() {
        let fe = FrontEnd::default();
        assert!(!fe.registered);
        assert!(fe.kickback_rate.is_zero());
    }

    // S1 — single depositor, single partial offset.
    #[test]
    fn test_single_depositor_partial_offset() {
        let total = U256::from(1000u64) * one();
        let debt = U256::from(400u64) * one();
        let coll = U256::from(10u64) * one();

        let furfi_numerator = coll * one();
        let furfi_gain_per_unit = furfi_numerator / total;

        let loss_numerator = debt * one();
        let furusd_loss_per_unit = loss_numerator / total + U256::one();

        let p = one();
        let marginal_gain = furfi_gain_per_unit * p;
        let new_product_factor = one() - furusd_loss_per_unit;
        let new_p = p * new_product_factor / one();

        // Alice's collateral gain for initial_value=1000*ONE, snapshot p=ONE, s0=0
        let gain = total * marginal_gain / p / one();
        assert_eq!(gain, coll);

        let new_total = total - debt;
        assert_eq!(new_total, U256::from(600u64) * one());
        assert_eq!(new_p, U256::from(6u64) * U256::from(10u64).pow(U256::from(17u64)));
    }

    // S2 — two depositors, proportional gain.
    #[test]
    fn test_two_depositors_proportional_gain() {
        let total = U256::from(4000u64) * one();
        let coll = U256::from(10u64) * one();
        let furfi_gain_per_unit = coll * one() / total;
        let p = one();
        let marginal_gain = furfi_gain_per_unit * p;

        let alice_initial = U256::from(1000u64) * one();
        let bob_initial = U256::from(3000u64) * one();
        let alice_gain = alice_initial * marginal_gain / p / one();
        let bob_gain = bob_initial * marginal_gain / p / one();

        assert_eq!(alice_gain, U256::from(25u64) * one() / U256::from(10u64));
        assert_eq!(bob_gain, U256::from(75u64) * one() / U256::from(10u64));
    }

    // S3 — full depletion: product factor collapses to zero, epoch advances.
    #[test]
    fn test_full_depletion_resets_epoch() {
        let total = U256::from(1000u64) * one();
        let debt = total;
        let furusd_loss_per_unit = one(); // forced on exact depletion
        let new_product_factor = one().checked_sub(furusd_loss_per_unit);
        assert_eq!(new_product_factor, Some(U256::zero()));
        let _ = debt;
    }

    // S5 — front-end split.
    #[test]
    fn test_front_end_split() {
        let kickback_rate = U256::from(8u64) * one() / U256::from(10u64); // 0.8 * ONE
        let loan_gain = U256::from(100u64) * one();
        let depositor_share = loan_gain * kickback_rate / one();
        let front_end_share = loan_gain * (one() - kickback_rate) / one();
        assert_eq!(depositor_share, U256::from(80u64) * one());
        assert_eq!(front_end_share, U256::from(20u64) * one());
        assert_eq!(depositor_share + front_end_share, loan_gain);
    }

    #[test]
    fn test_kickback_rate_out_of_range() {
        let too_high = one() + U256::one();
        assert!(too_high > one());
    }
}
