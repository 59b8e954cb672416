use carpool_types::{RideId, UserId};

use crate::error::Result;
use crate::records::{Credits, RideCompletion, RideSettlement};

/// Read boundary for wallet and earnings queries.
///
/// Reads never create entries; unknown users report 0.
pub trait CreditReader: Send + Sync {
    /// Net credits available to `user`.
    fn wallet_balance(&self, user: &UserId) -> Result<Credits>;

    /// Credits `user` has earned by driving in the current accounting week.
    fn weekly_earned(&self, user: &UserId) -> Result<Credits>;

    /// Every known wallet, sorted by user id.
    fn balances(&self) -> Result<Vec<(UserId, Credits)>>;

    /// Every user with a wallet or weekly counter, sorted.
    fn users(&self) -> Result<Vec<UserId>>;

    /// The settlement recorded for `ride`, if deduplication retained one.
    fn settlement_for(&self, ride: &RideId) -> Result<Option<RideSettlement>>;
}

/// Write boundary for ledger updates.
pub trait CreditWriter: Send + Sync {
    /// Charge every rider and pay the driver for a completed ride, as one
    /// unit of work.
    fn process_ride_completion(&self, completion: &RideCompletion) -> Result<RideSettlement>;

    /// Reset one user's weekly-earned counter, returning its previous value.
    fn reset_weekly_earned(&self, user: &UserId) -> Result<Credits>;

    /// Clear every weekly-earned counter, returning how many were cleared.
    fn reset_all_weekly_earned(&self) -> Result<usize>;
}
