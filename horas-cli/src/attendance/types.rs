//! Core attendance types

use serde::Serialize;

/// Column names as they appear in attendance sheets
pub mod columns {
    pub const CPF: &str = "CPF";
    pub const DRE: &str = "DRE";
    pub const SCHOOL: &str = "Nome da escola";
    pub const PARTICIPANT: &str = "Cursista";
    pub const HOURS: &str = "CH cursada";
    pub const TOTAL_HOURS: &str = "CH total";

    /// Columns every sheet must provide, in output order
    pub const REQUIRED: [&str; 5] = [CPF, DRE, SCHOOL, PARTICIPANT, HOURS];

    /// Headers that sheets write with stray trailing whitespace
    pub const CANONICAL_VARIANTS: [&str; 2] = [DRE, TOTAL_HOURS];
}

/// One normalized attendance row
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub key: GroupKey,
    /// Attended hours, already coerced from clock strings
    pub hours: f64,
}

/// Grouping key shared by both aggregation phases
///
/// Ordering follows field order, so a `BTreeMap<GroupKey, _>` yields groups
/// sorted by CPF, then DRE, then school, then participant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GroupKey {
    pub cpf: String,
    pub dre: String,
    pub school: String,
    pub participant: String,
}

impl GroupKey {
    pub fn new(
        cpf: impl Into<String>,
        dre: impl Into<String>,
        school: impl Into<String>,
        participant: impl Into<String>,
    ) -> Self {
        Self {
            cpf: cpf.into(),
            dre: dre.into(),
            school: school.into(),
            participant: participant.into(),
        }
    }
}

/// One row of the final result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRow {
    #[serde(rename = "CPF")]
    pub cpf: String,
    #[serde(rename = "DRE")]
    pub dre: String,
    #[serde(rename = "Nome da escola")]
    pub school: String,
    #[serde(rename = "Cursista")]
    pub participant: String,
    #[serde(rename = "CH cursada")]
    pub hours: f64,
}

impl AggregatedRow {
    pub fn from_group(key: GroupKey, hours: f64) -> Self {
        Self {
            cpf: key.cpf,
            dre: key.dre,
            school: key.school,
            participant: key.participant,
            hours,
        }
    }

    pub fn key_fields(&self) -> [&str; 4] {
        [&self.cpf, &self.dre, &self.school, &self.participant]
    }
}

/// Everything a successful run hands back to the caller
#[derive(Debug, Clone, Serialize)]
pub struct AggregationReport {
    pub rows: Vec<AggregatedRow>,
    /// Distinct non-blank CPF values
    pub total_cpfs: usize,
    /// Sum of all hours, rounded to two decimals
    pub total_hours: f64,
    pub files_processed: usize,
    pub sheets_processed: usize,
    pub output_path: std::path::PathBuf,
}

/// Round half away from zero to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_group_key_orders_by_cpf_then_dre() {
        let mut groups = BTreeMap::new();
        groups.insert(GroupKey::new("222", "1", "Escola A", "Ana"), 1.0);
        groups.insert(GroupKey::new("111", "9", "Escola B", "Bia"), 1.0);
        groups.insert(GroupKey::new("111", "2", "Escola C", "Caio"), 1.0);

        let order: Vec<(&str, &str)> = groups
            .keys()
            .map(|k| (k.cpf.as_str(), k.dre.as_str()))
            .collect();
        assert_eq!(order, vec![("111", "2"), ("111", "9"), ("222", "1")]);
    }

    #[test]
    fn test_row_serializes_with_sheet_column_names() {
        let row = AggregatedRow::from_group(GroupKey::new("111", "123", "Escola A", "Ana"), 2.5);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["CPF"], "111");
        assert_eq!(json["Nome da escola"], "Escola A");
        assert_eq!(json["CH cursada"], 2.5);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(3.0), 3.0);
        assert_eq!(round2(1.0 / 3.0), 0.33);
        assert_eq!(round2(2.675_000_1), 2.68);
    }
}
