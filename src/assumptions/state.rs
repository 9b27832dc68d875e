//! State income-tax rules: none, flat, or progressive.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::assumptions::federal::{Bracket, FederalBrackets};
use crate::household::FilingStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StateRule {
    None,
    Flat { rate: f64 },
    Progressive { brackets: FederalBrackets },
}

impl StateRule {
    pub fn tax_owed(&self, taxable_income: Decimal) -> Decimal {
        match self {
            StateRule::None => Decimal::ZERO,
            StateRule::Flat { rate } => {
                (taxable_income.max(Decimal::ZERO)) * Decimal::from_f64(*rate).unwrap_or(Decimal::ZERO)
            }
            StateRule::Progressive { brackets } => brackets.tax_owed(taxable_income),
        }
    }
}

/// State-rule registry keyed by two-letter state code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateRules {
    pub rules: HashMap<String, HashMap<FilingStatusKey, StateRule>>,
}

/// `FilingStatus` is not `Eq`/`Hash`-friendly as a map key across crates
/// that derive differently, so state rules are keyed by this local mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilingStatusKey {
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadOfHousehold,
}

impl From<FilingStatus> for FilingStatusKey {
    fn from(value: FilingStatus) -> Self {
        match value {
            FilingStatus::Single => FilingStatusKey::Single,
            FilingStatus::MarriedJoint => FilingStatusKey::MarriedJoint,
            FilingStatus::MarriedSeparate => FilingStatusKey::MarriedSeparate,
            FilingStatus::HeadOfHousehold => FilingStatusKey::HeadOfHousehold,
        }
    }
}

impl StateRules {
    /// State rule for `state` / `status`. Unregistered states fall back to
    /// `StateRule::None` (not a reference-data error: most states either
    /// have no income tax or are not yet tabulated in this core).
    pub fn rule_for(&self, state: &str, status: FilingStatus) -> StateRule {
        self.rules
            .get(state)
            .and_then(|by_status| by_status.get(&FilingStatusKey::from(status)))
            .cloned()
            .unwrap_or(StateRule::None)
    }
}

/// A handful of representative 2024 state rules: no-tax (FL, TX), flat
/// (AZ, CO), and progressive (CA, NY) — the major cases named in spec.md
/// §8's end-to-end scenarios. Unlisted states fall back to `None`.
pub fn state_rules_2024() -> StateRules {
    let mut rules: HashMap<String, HashMap<FilingStatusKey, StateRule>> = HashMap::new();

    for state in ["FL", "TX", "NV", "WA", "AK", "SD", "WY", "TN", "NH"] {
        let mut by_status = HashMap::new();
        for status in all_statuses() {
            by_status.insert(status, StateRule::None);
        }
        rules.insert(state.to_string(), by_status);
    }

    let mut az = HashMap::new();
    for status in all_statuses() {
        az.insert(status, StateRule::Flat { rate: 0.025 });
    }
    rules.insert("AZ".to_string(), az);

    let mut co = HashMap::new();
    for status in all_statuses() {
        co.insert(status, StateRule::Flat { rate: 0.044 });
    }
    rules.insert("CO".to_string(), co);

    let mut ca = HashMap::new();
    ca.insert(
        FilingStatusKey::Single,
        StateRule::Progressive { brackets: ca_brackets_single() },
    );
    ca.insert(
        FilingStatusKey::MarriedJoint,
        StateRule::Progressive { brackets: ca_brackets_married_joint() },
    );
    ca.insert(
        FilingStatusKey::MarriedSeparate,
        StateRule::Progressive { brackets: ca_brackets_single() },
    );
    ca.insert(
        FilingStatusKey::HeadOfHousehold,
        StateRule::Progressive { brackets: ca_brackets_single() },
    );
    rules.insert("CA".to_string(), ca);

    let mut ny = HashMap::new();
    ny.insert(
        FilingStatusKey::Single,
        StateRule::Progressive { brackets: ny_brackets_single() },
    );
    ny.insert(
        FilingStatusKey::MarriedJoint,
        StateRule::Progressive { brackets: ny_brackets_married_joint() },
    );
    ny.insert(
        FilingStatusKey::MarriedSeparate,
        StateRule::Progressive { brackets: ny_brackets_single() },
    );
    ny.insert(
        FilingStatusKey::HeadOfHousehold,
        StateRule::Progressive { brackets: ny_brackets_single() },
    );
    rules.insert("NY".to_string(), ny);

    StateRules { rules }
}

fn all_statuses() -> [FilingStatusKey; 4] {
    [
        FilingStatusKey::Single,
        FilingStatusKey::MarriedJoint,
        FilingStatusKey::MarriedSeparate,
        FilingStatusKey::HeadOfHousehold,
    ]
}

fn ca_brackets_single() -> FederalBrackets {
    FederalBrackets {
        brackets: vec![
            Bracket { floor: dec!(0), rate: 0.01 },
            Bracket { floor: dec!(10412), rate: 0.02 },
            Bracket { floor: dec!(24684), rate: 0.04 },
            Bracket { floor: dec!(38959), rate: 0.06 },
            Bracket { floor: dec!(54081), rate: 0.08 },
            Bracket { floor: dec!(68350), rate: 0.093 },
            Bracket { floor: dec!(349137), rate: 0.103 },
            Bracket { floor: dec!(418961), rate: 0.113 },
            Bracket { floor: dec!(698271), rate: 0.123 },
            Bracket { floor: dec!(1000000), rate: 0.133 },
        ],
    }
}

fn ca_brackets_married_joint() -> FederalBrackets {
    FederalBrackets {
        brackets: vec![
            Bracket { floor: dec!(0), rate: 0.01 },
            Bracket { floor: dec!(20824), rate: 0.02 },
            Bracket { floor: dec!(49368), rate: 0.04 },
            Bracket { floor: dec!(77918), rate: 0.06 },
            Bracket { floor: dec!(108162), rate: 0.08 },
            Bracket { floor: dec!(136700), rate: 0.093 },
            Bracket { floor: dec!(698274), rate: 0.103 },
            Bracket { floor: dec!(837922), rate: 0.113 },
            Bracket { floor: dec!(1396542), rate: 0.123 },
            Bracket { floor: dec!(2000000), rate: 0.133 },
        ],
    }
}

fn ny_brackets_single() -> FederalBrackets {
    FederalBrackets {
        brackets: vec![
            Bracket { floor: dec!(0), rate: 0.04 },
            Bracket { floor: dec!(8500), rate: 0.045 },
            Bracket { floor: dec!(11700), rate: 0.0525 },
            Bracket { floor: dec!(13900), rate: 0.0585 },
            Bracket { floor: dec!(80650), rate: 0.0625 },
            Bracket { floor: dec!(215400), rate: 0.0685 },
            Bracket { floor: dec!(1077550), rate: 0.0965 },
            Bracket { floor: dec!(5000000), rate: 0.103 },
            Bracket { floor: dec!(25000000), rate: 0.109 },
        ],
    }
}

fn ny_brackets_married_joint() -> FederalBrackets {
    FederalBrackets {
        brackets: vec![
            Bracket { floor: dec!(0), rate: 0.04 },
            Bracket { floor: dec!(17150), rate: 0.045 },
            Bracket { floor: dec!(23600), rate: 0.0525 },
            Bracket { floor: dec!(27900), rate: 0.0585 },
            Bracket { floor: dec!(161550), rate: 0.0625 },
            Bracket { floor: dec!(323200), rate: 0.0685 },
            Bracket { floor: dec!(2155350), rate: 0.0965 },
            Bracket { floor: dec!(5000000), rate: 0.103 },
            Bracket { floor: dec!(25000000), rate: 0.109 },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_tax_state_owes_nothing() {
        let rules = state_rules_2024();
        let rule = rules.rule_for("FL", FilingStatus::Single);
        assert_eq!(rule.tax_owed(dec!(100000)), Decimal::ZERO);
    }

    #[test]
    fn flat_state_applies_single_rate() {
        let rules = state_rules_2024();
        let rule = rules.rule_for("AZ", FilingStatus::MarriedJoint);
        assert_eq!(rule.tax_owed(dec!(100000)), dec!(2500));
    }

    #[test]
    fn unregistered_state_falls_back_to_none() {
        let rules = state_rules_2024();
        let rule = rules.rule_for("ZZ", FilingStatus::Single);
        assert_eq!(rule.tax_owed(dec!(100000)), Decimal::ZERO);
    }

    #[test]
    fn progressive_state_is_nontrivial_for_high_earner() {
        let rules = state_rules_2024();
        let rule = rules.rule_for("CA", FilingStatus::MarriedJoint);
        let tax = rule.tax_owed(dec!(520000));
        assert!(tax > dec!(20000));
    }
}
