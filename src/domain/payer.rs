use serde::{Serialize, Serializer, ser::SerializeMap};

use super::{Cents, ValidationError, cents_to_f64};

/// One of the two participants sharing the fund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Payer {
    Trung,
    Thang,
}

impl Payer {
    /// Every payer, in display order.
    pub const ALL: [Payer; 2] = [Payer::Trung, Payer::Thang];

    pub fn as_str(&self) -> &'static str {
        match self {
            Payer::Trung => "Trung",
            Payer::Thang => "Thang",
        }
    }

    /// The participant on the other side of the split.
    pub fn other(&self) -> Payer {
        match self {
            Payer::Trung => Payer::Thang,
            Payer::Thang => Payer::Trung,
        }
    }
}

impl std::str::FromStr for Payer {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Trung" => Ok(Payer::Trung),
            "Thang" => Ok(Payer::Thang),
            _ => Err(ValidationError::UnknownPayer(s.to_string())),
        }
    }
}

impl std::fmt::Display for Payer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An amount for each payer. Used for both totals and signed balances.
///
/// Serializes as a JSON object keyed by payer name with decimal amounts,
/// e.g. `{"Trung": 100.0, "Thang": 50.0}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayerAmounts {
    pub trung: Cents,
    pub thang: Cents,
}

impl PayerAmounts {
    pub fn new(trung: Cents, thang: Cents) -> Self {
        Self { trung, thang }
    }

    pub fn get(&self, payer: Payer) -> Cents {
        match payer {
            Payer::Trung => self.trung,
            Payer::Thang => self.thang,
        }
    }

    pub fn set(&mut self, payer: Payer, amount: Cents) {
        match payer {
            Payer::Trung => self.trung = amount,
            Payer::Thang => self.thang = amount,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Payer, Cents)> + '_ {
        Payer::ALL.into_iter().map(|payer| (payer, self.get(payer)))
    }

    /// Combined amount of both payers, or `None` if it does not fit in [Cents].
    pub fn total(&self) -> Option<Cents> {
        self.trung.checked_add(self.thang)
    }
}

impl Serialize for PayerAmounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Payer::ALL.len()))?;
        for (payer, amount) in self.iter() {
            map.serialize_entry(payer.as_str(), &cents_to_f64(amount))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_is_checked() {
        assert_eq!(PayerAmounts::new(10000, 5000).total(), Some(15000));
        assert_eq!(PayerAmounts::new(i64::MAX, 1).total(), None);
        assert_eq!(PayerAmounts::new(5_000_000_000_000_000_000, 5_000_000_000_000_000_000).total(), None);
    }

    #[test]
    fn test_parse_payer() {
        assert_eq!("Trung".parse::<Payer>(), Ok(Payer::Trung));
        assert_eq!("Thang".parse::<Payer>(), Ok(Payer::Thang));
    }

    #[test]
    fn test_parse_payer_is_exact() {
        assert_eq!(
            "Alice".parse::<Payer>(),
            Err(ValidationError::UnknownPayer("Alice".to_string()))
        );
        assert!("trung".parse::<Payer>().is_err());
        assert!("".parse::<Payer>().is_err());
    }

    #[test]
    fn test_display_matches_parse() {
        for payer in Payer::ALL {
            assert_eq!(payer.to_string().parse::<Payer>(), Ok(payer));
        }
    }

    #[test]
    fn test_other() {
        assert_eq!(Payer::Trung.other(), Payer::Thang);
        assert_eq!(Payer::Thang.other(), Payer::Trung);
    }

    #[test]
    fn test_payer_amounts_serialize_as_named_map() {
        let amounts = PayerAmounts::new(10000, -2550);
        let json = serde_json::to_value(amounts).unwrap();
        assert_eq!(json, serde_json::json!({ "Trung": 100.0, "Thang": -25.5 }));
    }
}
