//! Bracket Tables (spec component A): immutable reference data loaded once
//! at process start, keyed by tax year. Mirrors the teacher's `Assumptions`
//! container, which composes several sub-assumption structs into one type
//! built once via `default_pricing()` or loaded from CSV.

pub mod federal;
pub mod irmaa;
pub mod ltcg;
pub mod niit;
pub mod rmd;
pub mod standard_deduction;
pub mod state;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::household::FilingStatus;
use federal::FederalBrackets;
use irmaa::IrmaaTiers;
use ltcg::LtcgBrackets;
use rmd::RmdTable;
use standard_deduction::StandardDeduction;
use state::StateRules;

/// All bracket tables for a single tax year, immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxTables {
    pub tax_year: u32,
    pub federal: HashMap<FilingStatusKind, FederalBrackets>,
    pub ltcg: HashMap<FilingStatusKind, LtcgBrackets>,
    pub irmaa: HashMap<FilingStatusKind, IrmaaTiers>,
    pub standard_deduction: HashMap<FilingStatusKind, StandardDeduction>,
    pub state_rules: StateRules,
    pub rmd_table: RmdTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilingStatusKind {
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadOfHousehold,
}

impl From<FilingStatus> for FilingStatusKind {
    fn from(value: FilingStatus) -> Self {
        match value {
            FilingStatus::Single => FilingStatusKind::Single,
            FilingStatus::MarriedJoint => FilingStatusKind::MarriedJoint,
            FilingStatus::MarriedSeparate => FilingStatusKind::MarriedSeparate,
            FilingStatus::HeadOfHousehold => FilingStatusKind::HeadOfHousehold,
        }
    }
}

fn all_statuses() -> [FilingStatus; 4] {
    [
        FilingStatus::Single,
        FilingStatus::MarriedJoint,
        FilingStatus::MarriedSeparate,
        FilingStatus::HeadOfHousehold,
    ]
}

impl TaxTables {
    /// The only tax year embedded in this core. Loading is one-shot;
    /// callers that need another year must supply their own tables via
    /// [`TaxTables::from_csv_path`] — reloading on tax-year change is
    /// permitted but is not a hot path.
    pub fn for_year(tax_year: u32) -> crate::error::CoreResult<Self> {
        if tax_year != 2024 {
            return Err(crate::error::CoreError::ReferenceDataMissing(format!(
                "no embedded bracket tables for tax year {tax_year}"
            )));
        }
        Ok(Self::embedded_2024())
    }

    fn embedded_2024() -> Self {
        let mut federal = HashMap::new();
        let mut ltcg = HashMap::new();
        let mut irmaa = HashMap::new();
        let mut standard_deduction = HashMap::new();
        for status in all_statuses() {
            let key = FilingStatusKind::from(status);
            federal.insert(key, federal::federal_brackets_2024(status));
            ltcg.insert(key, ltcg::ltcg_brackets_2024(status));
            irmaa.insert(key, irmaa::irmaa_tiers_2024(status));
            standard_deduction.insert(key, standard_deduction::standard_deduction_2024(status));
        }
        TaxTables {
            tax_year: 2024,
            federal,
            ltcg,
            irmaa,
            standard_deduction,
            state_rules: state::state_rules_2024(),
            rmd_table: rmd::uniform_lifetime_table(),
        }
    }

    /// Load an override bracket-table snapshot from a directory of CSV
    /// files, the way the teacher's `Assumptions::from_csv_path` loads
    /// mortality/lapse/product CSVs. Only the RMD table is override-able
    /// today; the remaining tables still come from the embedded 2024
    /// snapshot.
    pub fn from_csv_path(tax_year: u32, dir: &std::path::Path) -> crate::error::CoreResult<Self> {
        let mut tables = Self::embedded_2024();
        tables.tax_year = tax_year;
        let rmd_path = dir.join("rmd_table.csv");
        if rmd_path.exists() {
            tables.rmd_table = load_rmd_table_csv(&rmd_path)?;
        }
        Ok(tables)
    }

    pub fn federal_for(&self, status: FilingStatus) -> &FederalBrackets {
        self.federal
            .get(&FilingStatusKind::from(status))
            .expect("every filing status has an embedded federal bracket entry")
    }

    pub fn ltcg_for(&self, status: FilingStatus) -> &LtcgBrackets {
        self.ltcg
            .get(&FilingStatusKind::from(status))
            .expect("every filing status has an embedded LTCG bracket entry")
    }

    pub fn irmaa_for(&self, status: FilingStatus) -> &IrmaaTiers {
        self.irmaa
            .get(&FilingStatusKind::from(status))
            .expect("every filing status has an embedded IRMAA tier entry")
    }

    pub fn standard_deduction_for(&self, status: FilingStatus) -> &StandardDeduction {
        self.standard_deduction
            .get(&FilingStatusKind::from(status))
            .expect("every filing status has an embedded standard-deduction entry")
    }
}

#[derive(Debug, Deserialize)]
struct RmdCsvRow {
    age: u8,
    factor: f64,
}

fn load_rmd_table_csv(path: &std::path::Path) -> crate::error::CoreResult<RmdTable> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        crate::error::CoreError::ReferenceDataMissing(format!(
            "failed to open RMD table override at {}: {e}",
            path.display()
        ))
    })?;
    let mut factors = Vec::new();
    for result in reader.deserialize() {
        let row: RmdCsvRow = result.map_err(|e| {
            crate::error::CoreError::ReferenceDataMissing(format!("malformed RMD table row: {e}"))
        })?;
        factors.push((row.age, row.factor));
    }
    factors.sort_by_key(|(age, _)| *age);
    Ok(RmdTable::from_rows(factors))
}
