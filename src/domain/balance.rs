//! Balance arithmetic for an equal two-way split.
//!
//! Everything here is pure: inputs are the per-payer totals returned by the
//! store, outputs are derived amounts in cents.

use serde::Serialize;

use super::{Cents, Payer, PayerAmounts, halve_cents};

/// Each payer's over/under-payment relative to an equal split.
///
/// A positive balance means the payer paid more than their share and is owed
/// money; a negative balance means they owe. The two balances are always exact
/// negatives of each other. Half-cents are rounded to the nearest even cent.
///
/// Totals are sums of positive amounts, so their difference always fits.
pub fn outstanding_balance(totals: &PayerAmounts) -> PayerAmounts {
    let trung = halve_cents(totals.trung - totals.thang);
    PayerAmounts::new(trung, -trung)
}

/// Who owes whom, and how much.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Debt {
    pub from: Payer,
    pub to: Payer,
    #[serde(with = "super::money::decimal")]
    pub amount: Cents,
}

/// Settle outstanding balances into a single debt, or `None` if already even.
pub fn settlement(balances: &PayerAmounts) -> Option<Debt> {
    let trung = balances.trung;
    let from = match trung.signum() {
        0 => return None,
        1 => Payer::Thang,
        _ => Payer::Trung,
    };

    Some(Debt {
        from,
        to: from.other(),
        amount: trung.abs(),
    })
}

/// Full monthly balance summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceReport {
    #[serde(with = "super::money::decimal")]
    pub total_fund: Cents,
    pub totals: PayerAmounts,
    #[serde(with = "super::money::decimal")]
    pub each_person_share: Cents,
    pub balances: PayerAmounts,
    pub debt: Option<Debt>,
}

impl BalanceReport {
    /// Build the report from per-payer totals.
    ///
    /// Returns `None` if the combined total does not fit in [Cents].
    pub fn from_totals(totals: PayerAmounts) -> Option<Self> {
        let total_fund = totals.total()?;
        let balances = outstanding_balance(&totals);

        Some(Self {
            total_fund,
            totals,
            each_person_share: halve_cents(total_fund),
            balances,
            debt: settlement(&balances),
        })
    }
}
