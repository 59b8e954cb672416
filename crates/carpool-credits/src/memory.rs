//! In-memory credit ledger.
//!
//! [`InMemoryCreditLedger`] keeps every wallet and weekly counter in a
//! `HashMap` behind a single `RwLock`. A ride completion holds the write lock
//! from pricing to the final counter update, so the weekly-cap check and the
//! counter increment can never interleave with another completion. Nothing is
//! persisted: dropping the ledger drops all balances.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use carpool_types::{RideId, UserId};
use chrono::{DateTime, Datelike, IsoWeek, Utc};
use tracing::{debug, info, warn};

use crate::config::CreditConfig;
use crate::error::{CreditError, Result};
use crate::records::{CreditTransaction, Credits, RideCompletion, RideSettlement};
use crate::traits::{CreditReader, CreditWriter};

/// In-memory credit ledger for embedding, tests, and demos.
#[derive(Debug)]
pub struct InMemoryCreditLedger {
    config: CreditConfig,
    inner: RwLock<LedgerState>,
}

#[derive(Debug, Default)]
struct LedgerState {
    wallet: HashMap<UserId, Credits>,
    weekly_earned: HashMap<UserId, Credits>,
    settled: HashMap<RideId, RideSettlement>,
    current_week: Option<IsoWeek>,
}

impl LedgerState {
    fn balance(&self, user: &UserId) -> Credits {
        self.wallet.get(user).copied().unwrap_or(0)
    }

    fn earned(&self, user: &UserId) -> Credits {
        self.weekly_earned.get(user).copied().unwrap_or(0)
    }

    /// Final balance of every participant after charging each rider `amount`
    /// in input order and paying the driver `driver_earned`.
    ///
    /// Reads only. Fails if any rider would end below `floor` or any balance
    /// would leave the `Credits` range.
    fn project_balances(
        &self,
        completion: &RideCompletion,
        amount: Credits,
        driver_earned: Credits,
        floor: Option<Credits>,
    ) -> Result<HashMap<UserId, Credits>> {
        let mut projected: HashMap<UserId, Credits> = HashMap::new();

        for rider in &completion.rider_ids {
            let balance = projected
                .entry(rider.clone())
                .or_insert_with(|| self.balance(rider));
            let next = balance
                .checked_sub(amount)
                .ok_or_else(|| CreditError::BalanceOverflow { user: rider.clone() })?;
            if let Some(floor) = floor {
                if next < floor {
                    return Err(CreditError::InsufficientCredits {
                        user: rider.clone(),
                        balance: *balance,
                        amount,
                        floor,
                    });
                }
            }
            *balance = next;
        }

        let driver = &completion.driver_id;
        let balance = projected
            .entry(driver.clone())
            .or_insert_with(|| self.balance(driver));
        *balance = balance
            .checked_add(driver_earned)
            .ok_or_else(|| CreditError::BalanceOverflow { user: driver.clone() })?;

        Ok(projected)
    }

    /// Whether `week` is later than the last week a settlement landed in.
    fn starts_new_week(&self, week: IsoWeek) -> bool {
        matches!(self.current_week, Some(current) if week > current)
    }

    /// Clear weekly counters when `week` is later than the last seen week.
    /// Out-of-order timestamps from an earlier week are ignored.
    fn roll_week(&mut self, week: IsoWeek) {
        match self.current_week {
            Some(current) if week <= current => {}
            Some(current) => {
                let cleared = self.weekly_earned.len();
                self.weekly_earned.clear();
                self.current_week = Some(week);
                info!(
                    from = %format_week(current),
                    to = %format_week(week),
                    cleared,
                    "accounting week rolled over"
                );
            }
            None => self.current_week = Some(week),
        }
    }
}

fn format_week(week: IsoWeek) -> String {
    format!("{}-W{:02}", week.year(), week.week())
}

impl InMemoryCreditLedger {
    /// Create an empty ledger with the given configuration.
    pub fn new(config: CreditConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(LedgerState::default()),
        }
    }

    /// The configuration this ledger was created with.
    pub fn config(&self) -> &CreditConfig {
        &self.config
    }

    /// Price a ride of the given distance. Pure; touches no state.
    pub fn estimate_credits(&self, distance_miles: Option<f64>) -> Credits {
        self.config.estimate_credits(distance_miles)
    }

    /// Apply a ride completion as of `at`.
    ///
    /// `at` only matters when automatic week rollover is enabled. A rejected
    /// completion leaves balances, counters and the accounting week untouched.
    pub fn process_ride_completion_at(
        &self,
        completion: &RideCompletion,
        at: DateTime<Utc>,
    ) -> Result<RideSettlement> {
        let mut state = self.inner.write().map_err(|e| {
            CreditError::LockPoisoned(e.to_string())
        })?;

        if self.config.dedupe_rides {
            if let Some(prior) = state.settled.get(&completion.ride_id) {
                debug!(ride = %completion.ride_id, "duplicate ride completion ignored");
                return Ok(prior.clone());
            }
        }

        let week = self.config.auto_week_rollover.then(|| at.iso_week());
        let rolling_over = week.is_some_and(|w| state.starts_new_week(w));

        let amount = self.config.estimate_credits(completion.distance_miles);

        let driver = &completion.driver_id;
        let earned_so_far = if rolling_over { 0 } else { state.earned(driver) };
        let allowable = self
            .config
            .weekly_earn_cap
            .saturating_sub(earned_so_far)
            .max(0);
        let driver_earned = amount.min(allowable);

        let projected = state.project_balances(
            completion,
            amount,
            driver_earned,
            self.config.overdraft_floor,
        )?;

        if let Some(week) = week {
            state.roll_week(week);
        }
        state.wallet.extend(projected);
        state
            .weekly_earned
            .insert(driver.clone(), earned_so_far + driver_earned);

        let mut transactions: Vec<CreditTransaction> = completion
            .rider_ids
            .iter()
            .map(|rider| {
                CreditTransaction::spend(rider.clone(), amount, completion.ride_id.clone())
            })
            .collect();
        transactions.push(CreditTransaction::earn(
            driver.clone(),
            driver_earned,
            amount,
            completion.ride_id.clone(),
        ));

        if driver_earned < amount {
            warn!(
                ride = %completion.ride_id,
                driver = %driver,
                amount,
                driver_earned,
                cap = self.config.weekly_earn_cap,
                "driver earnings capped"
            );
        }
        debug!(
            ride = %completion.ride_id,
            amount,
            riders = completion.rider_ids.len(),
            driver_earned,
            "ride settled"
        );

        let settlement = RideSettlement {
            amount,
            driver_earned,
            transactions,
        };
        if self.config.dedupe_rides {
            state
                .settled
                .insert(completion.ride_id.clone(), settlement.clone());
        }
        Ok(settlement)
    }
}

impl Default for InMemoryCreditLedger {
    fn default() -> Self {
        Self::new(CreditConfig::default())
    }
}

impl CreditReader for InMemoryCreditLedger {
    fn wallet_balance(&self, user: &UserId) -> Result<Credits> {
        let state = self.inner.read().map_err(|e| {
            CreditError::LockPoisoned(e.to_string())
        })?;
        Ok(state.balance(user))
    }

    fn weekly_earned(&self, user: &UserId) -> Result<Credits> {
        let state = self.inner.read().map_err(|e| {
            CreditError::LockPoisoned(e.to_string())
        })?;
        Ok(state.earned(user))
    }

    fn balances(&self) -> Result<Vec<(UserId, Credits)>> {
        let state = self.inner.read().map_err(|e| {
            CreditError::LockPoisoned(e.to_string())
        })?;
        let mut result: Vec<(UserId, Credits)> = state
            .wallet
            .iter()
            .map(|(user, balance)| (user.clone(), *balance))
            .collect();
        result.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(result)
    }

    fn users(&self) -> Result<Vec<UserId>> {
        let state = self.inner.read().map_err(|e| {
            CreditError::LockPoisoned(e.to_string())
        })?;
        let users: BTreeSet<&UserId> = state
            .wallet
            .keys()
            .chain(state.weekly_earned.keys())
            .collect();
        Ok(users.into_iter().cloned().collect())
    }

    fn settlement_for(&self, ride: &RideId) -> Result<Option<RideSettlement>> {
        let state = self.inner.read().map_err(|e| {
            CreditError::LockPoisoned(e.to_string())
        })?;
        Ok(state.settled.get(ride).cloned())
    }
}

impl CreditWriter for InMemoryCreditLedger {
    fn process_ride_completion(&self, completion: &RideCompletion) -> Result<RideSettlement> {
        self.process_ride_completion_at(completion, Utc::now())
    }

    fn reset_weekly_earned(&self, user: &UserId) -> Result<Credits> {
        let mut state = self.inner.write().map_err(|e| {
            CreditError::LockPoisoned(e.to_string())
        })?;
        let previous = state.weekly_earned.remove(user).unwrap_or(0);
        debug!(user = %user, previous, "weekly earnings reset");
        Ok(previous)
    }

    fn reset_all_weekly_earned(&self) -> Result<usize> {
        let mut state = self.inner.write().map_err(|e| {
            CreditError::LockPoisoned(e.to_string())
        })?;
        let cleared = state.weekly_earned.len();
        state.weekly_earned.clear();
        info!(cleared, "all weekly earnings reset");
        Ok(cleared)
    }
}
