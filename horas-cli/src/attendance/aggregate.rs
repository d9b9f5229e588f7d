//! Grouping and summing of attended hours
//!
//! Sheets are summed on their own first, then the partial tables of every
//! file are stacked and summed again with the same key. Both passes emit
//! groups in ascending key order.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use super::types::{AggregatedRow, GroupKey, Record, round2};

/// Per-key totals, one entry per distinct key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialTable {
    pub rows: Vec<(GroupKey, f64)>,
}

impl PartialTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_hours(&self) -> f64 {
        self.rows.iter().map(|(_, h)| h).sum()
    }
}

fn group_sum<I>(rows: I) -> PartialTable
where
    I: IntoIterator<Item = (GroupKey, f64)>,
{
    let mut groups: BTreeMap<GroupKey, f64> = BTreeMap::new();
    for (key, hours) in rows {
        *groups.entry(key).or_insert(0.0) += hours;
    }
    PartialTable {
        rows: groups.into_iter().collect(),
    }
}

/// First pass: totals within a single sheet
pub fn aggregate_sheet(records: Vec<Record>) -> PartialTable {
    group_sum(records.into_iter().map(|r| (r.key, r.hours)))
}

/// Stack partial tables row-wise, keeping every row
pub fn concat_partials(partials: Vec<PartialTable>) -> PartialTable {
    PartialTable {
        rows: partials.into_iter().flat_map(|p| p.rows).collect(),
    }
}

/// Second pass: totals across the stacked partial tables
pub fn aggregate_global(stacked: PartialTable) -> Vec<AggregatedRow> {
    group_sum(stacked.rows)
        .rows
        .into_iter()
        .map(|(key, hours)| AggregatedRow::from_group(key, hours))
        .collect()
}

/// Compare key values numerically when both read as numbers
///
/// Numbers sort before text, which keeps the order total on mixed columns.
fn compare_key_text(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Stable sort by CPF, then DRE
pub fn sort_rows(rows: &mut [AggregatedRow]) {
    rows.sort_by(|a, b| {
        compare_key_text(&a.cpf, &b.cpf).then_with(|| compare_key_text(&a.dre, &b.dre))
    });
}

/// Distinct non-blank CPFs and the rounded hours total
pub fn summarize(rows: &[AggregatedRow]) -> (usize, f64) {
    let cpfs: HashSet<&str> = rows
        .iter()
        .map(|r| r.cpf.as_str())
        .filter(|cpf| !cpf.is_empty())
        .collect();
    let hours: f64 = rows.iter().map(|r| r.hours).sum();
    (cpfs.len(), round2(hours))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cpf: &str, dre: &str, school: &str, name: &str, hours: f64) -> Record {
        Record {
            key: GroupKey::new(cpf, dre, school, name),
            hours,
        }
    }

    fn sample_sheets() -> Vec<Vec<Record>> {
        vec![
            vec![
                record("333", "10", "Escola A", "Caio", 1.5),
                record("111", "20", "Escola B", "Ana", 1.0),
                record("111", "20", "Escola B", "Ana", 0.25),
                record("222", "10", "Escola A", "Bia", 4.0),
            ],
            vec![
                record("111", "20", "Escola B", "Ana", 2.0),
                record("111", "05", "Escola C", "Ana", 3.0),
                record("", "", "", "", 0.75),
            ],
        ]
    }

    fn run(sheets: Vec<Vec<Record>>) -> Vec<AggregatedRow> {
        let partials = sheets.into_iter().map(aggregate_sheet).collect();
        let mut rows = aggregate_global(concat_partials(partials));
        sort_rows(&mut rows);
        rows
    }

    #[test]
    fn test_sheet_pass_sums_duplicate_keys() {
        let table = aggregate_sheet(sample_sheets().remove(0));
        assert_eq!(table.len(), 3);
        let ana = table.rows.iter().find(|(k, _)| k.cpf == "111").unwrap();
        assert_eq!(ana.1, 1.25);
    }

    #[test]
    fn test_concat_keeps_every_row() {
        let partials: Vec<PartialTable> = sample_sheets().into_iter().map(aggregate_sheet).collect();
        let stacked = concat_partials(partials);
        assert_eq!(stacked.len(), 3 + 3);
    }

    #[test]
    fn test_hours_are_conserved() {
        let input_total: f64 = sample_sheets().iter().flatten().map(|r| r.hours).sum();
        let rows = run(sample_sheets());
        let output_total: f64 = rows.iter().map(|r| r.hours).sum();
        assert!((input_total - output_total).abs() < 1e-9);
    }

    #[test]
    fn test_no_duplicate_keys() {
        let rows = run(sample_sheets());
        let keys: HashSet<[&str; 4]> = rows.iter().map(|r| r.key_fields()).collect();
        assert_eq!(keys.len(), rows.len());
    }

    #[test]
    fn test_sorted_by_cpf_then_dre() {
        let rows = run(sample_sheets());
        let order: Vec<(&str, &str)> = rows.iter().map(|r| (r.cpf.as_str(), r.dre.as_str())).collect();
        assert_eq!(
            order,
            vec![("111", "05"), ("111", "20"), ("222", "10"), ("333", "10"), ("", "")]
        );
    }

    #[test]
    fn test_numeric_keys_sort_by_value() {
        let rows = run(vec![vec![
            record("111", "10", "Escola A", "Ana", 1.0),
            record("111", "9", "Escola B", "Ana", 1.0),
            record("1000", "1", "Escola A", "Caio", 1.0),
            record("200", "1", "Escola A", "Bia", 1.0),
            record("ABC", "1", "Escola A", "Duda", 1.0),
        ]]);
        let order: Vec<(&str, &str)> = rows.iter().map(|r| (r.cpf.as_str(), r.dre.as_str())).collect();
        assert_eq!(
            order,
            vec![("111", "9"), ("111", "10"), ("200", "1"), ("1000", "1"), ("ABC", "1")]
        );
    }

    #[test]
    fn test_compare_key_text() {
        assert_eq!(compare_key_text("9", "10"), Ordering::Less);
        assert_eq!(compare_key_text("05", "5"), Ordering::Less);
        assert_eq!(compare_key_text("10", "Escola"), Ordering::Less);
        assert_eq!(compare_key_text("", "1"), Ordering::Greater);
        assert_eq!(compare_key_text("Ana", "Bia"), Ordering::Less);
    }

    #[test]
    fn test_same_person_across_files_is_merged() {
        let rows = run(vec![
            vec![record("111", "1", "Escola A", "Ana", 1.0)],
            vec![record("111", "1", "Escola A", "Ana", 2.0)],
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].hours, 3.0);
    }

    #[test]
    fn test_conflicting_school_stays_separate() {
        let rows = run(vec![
            vec![record("111", "1", "Escola A", "Ana", 1.0)],
            vec![record("111", "1", "Escola B", "Ana", 2.0)],
        ]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].school, "Escola A");
        assert_eq!(rows[1].school, "Escola B");
    }

    #[test]
    fn test_summarize() {
        let rows = run(sample_sheets());
        let (cpfs, hours) = summarize(&rows);
        assert_eq!(cpfs, 3);
        assert_eq!(hours, 12.5);
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize(&[]), (0, 0.0));
    }
}
