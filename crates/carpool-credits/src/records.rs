use carpool_types::{RideId, UserId};
use serde::{Deserialize, Serialize};

/// Signed credit quantity. Balances may go negative.
pub type Credits = i64;

// ---------------------------------------------------------------------------
// RideCompletion
// ---------------------------------------------------------------------------

/// A completed ride as reported by the ride source.
///
/// Distance and participants are the only attributes the ledger looks at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideCompletion {
    pub ride_id: RideId,
    /// Distance in miles. Missing, zero, negative and non-finite values
    /// price the ride at zero credits.
    #[serde(default)]
    pub distance_miles: Option<f64>,
    /// Riders in the order their debits are applied.
    #[serde(default)]
    pub rider_ids: Vec<UserId>,
    pub driver_id: UserId,
}

impl RideCompletion {
    /// A completion with no riders.
    pub fn new(
        ride_id: impl Into<RideId>,
        distance_miles: Option<f64>,
        driver_id: impl Into<UserId>,
    ) -> Self {
        Self {
            ride_id: ride_id.into(),
            distance_miles,
            rider_ids: Vec::new(),
            driver_id: driver_id.into(),
        }
    }

    /// Replace the rider list.
    pub fn with_riders<I, U>(mut self, riders: I) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<UserId>,
    {
        self.rider_ids = riders.into_iter().map(Into::into).collect();
        self
    }
}

// ---------------------------------------------------------------------------
// CreditTransaction
// ---------------------------------------------------------------------------

/// Direction of a ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// A rider paying for a ride.
    Spend,
    /// A driver being credited for a ride.
    Earn,
}

/// One participant's share of a settled ride. Produced as output, never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTransaction {
    pub user_id: UserId,
    pub delta: Credits,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub ride_id: RideId,
    /// Only present on earn entries: whether the weekly cap reduced the payout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capped: Option<bool>,
}

impl CreditTransaction {
    /// A rider debit of `amount`.
    pub fn spend(user_id: UserId, amount: Credits, ride_id: RideId) -> Self {
        Self {
            user_id,
            delta: -amount,
            kind: TransactionKind::Spend,
            ride_id,
            capped: None,
        }
    }

    /// A driver credit of `earned` out of a ride priced at `amount`.
    pub fn earn(user_id: UserId, earned: Credits, amount: Credits, ride_id: RideId) -> Self {
        Self {
            user_id,
            delta: earned,
            kind: TransactionKind::Earn,
            ride_id,
            capped: Some(earned < amount),
        }
    }

    pub fn is_spend(&self) -> bool {
        self.kind == TransactionKind::Spend
    }

    pub fn is_earn(&self) -> bool {
        self.kind == TransactionKind::Earn
    }
}

// ---------------------------------------------------------------------------
// RideSettlement
// ---------------------------------------------------------------------------

/// Result of applying a ride completion to the ledger.
///
/// `transactions` holds one spend per rider in input order, followed by
/// exactly one earn entry for the driver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideSettlement {
    /// Credits charged to each rider.
    pub amount: Credits,
    /// Credits actually paid to the driver after the weekly cap.
    pub driver_earned: Credits,
    pub transactions: Vec<CreditTransaction>,
}

impl RideSettlement {
    /// Whether the weekly cap reduced the driver's payout.
    pub fn is_capped(&self) -> bool {
        self.driver_earned < self.amount
    }

    /// Sum of all rider debits, as a positive number. Widened so that many
    /// riders at the largest ride price cannot overflow.
    pub fn total_debited(&self) -> i128 {
        self.spends().map(|tx| -i128::from(tx.delta)).sum()
    }

    /// Rider debit entries in input order.
    pub fn spends(&self) -> impl Iterator<Item = &CreditTransaction> {
        self.transactions.iter().filter(|tx| tx.is_spend())
    }

    /// The driver's earn entry.
    pub fn earn(&self) -> Option<&CreditTransaction> {
        self.transactions.iter().find(|tx| tx.is_earn())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spend_serializes_without_capped() {
        let tx = CreditTransaction::spend("r1".into(), 12, "ride-1".into());
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "userId": "r1",
                "delta": -12,
                "type": "spend",
                "rideId": "ride-1",
            })
        );
    }

    #[test]
    fn earn_serializes_capped_flag() {
        let tx = CreditTransaction::earn("d1".into(), 5, 12, "ride-1".into());
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "earn");
        assert_eq!(json["delta"], 5);
        assert_eq!(json["capped"], true);
    }

    #[test]
    fn earn_of_zero_for_free_ride_is_not_capped() {
        let tx = CreditTransaction::earn("d1".into(), 0, 0, "ride-1".into());
        assert_eq!(tx.capped, Some(false));
    }

    #[test]
    fn completion_deserializes_with_defaults() {
        let completion: RideCompletion =
            serde_json::from_str(r#"{"rideId":"ride-9","driverId":"d"}"#).unwrap();
        assert_eq!(completion.distance_miles, None);
        assert!(completion.rider_ids.is_empty());
    }

    #[test]
    fn settlement_helpers() {
        let settlement = RideSettlement {
            amount: 12,
            driver_earned: 5,
            transactions: vec![
                CreditTransaction::spend("r1".into(), 12, "ride-1".into()),
                CreditTransaction::spend("r2".into(), 12, "ride-1".into()),
                CreditTransaction::earn("d".into(), 5, 12, "ride-1".into()),
            ],
        };
        assert!(settlement.is_capped());
        assert_eq!(settlement.total_debited(), 24);
        assert_eq!(settlement.spends().count(), 2);
        assert_eq!(settlement.earn().unwrap().user_id, UserId::from("d"));
    }

    #[test]
    fn total_debited_does_not_overflow_at_extremes() {
        let settlement = RideSettlement {
            amount: Credits::MAX,
            driver_earned: 0,
            transactions: vec![
                CreditTransaction::spend("r1".into(), Credits::MAX, "ride-1".into()),
                CreditTransaction::spend("r2".into(), Credits::MAX, "ride-1".into()),
            ],
        };
        assert_eq!(settlement.total_debited(), 2 * i128::from(Credits::MAX));
    }
}
