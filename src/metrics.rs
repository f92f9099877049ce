use tracing::debug;

use crate::schema::{RatioMetric, VALUE_CHANGE};
use crate::table::Table;

pub const DEFAULT_VALUE_CHANGE_LIMIT: f64 = 30.0;

pub fn apply_ratios(table: &mut Table, ratios: &[RatioMetric]) {
    for ratio in ratios {
        let inputs = ratio.numerator.iter().chain(ratio.denominator.iter());
        if let Some(missing) = inputs.clone().find(|c| !table.has_column(c)) {
            debug!(ratio = %ratio.column, missing = %missing, "ratio skipped");
            continue;
        }
        let values: Vec<f64> = (0..table.len())
            .map(|row| {
                let num: f64 = ratio
                    .numerator
                    .iter()
                    .filter_map(|c| table.get(row, c))
                    .sum();
                let den: f64 = ratio
                    .denominator
                    .iter()
                    .filter_map(|c| table.get(row, c))
                    .sum();
                num / den
            })
            .collect();
        table.set_column(&ratio.column, &values);
    }
}

/// Resets `value_change` entries whose magnitude exceeds `limit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueChangeGuard {
    pub limit: f64,
}

impl Default for ValueChangeGuard {
    fn default() -> Self {
        Self {
            limit: DEFAULT_VALUE_CHANGE_LIMIT,
        }
    }
}

impl ValueChangeGuard {
    pub fn new(limit: f64) -> Self {
        Self { limit: limit.abs() }
    }

    pub fn apply(&self, table: &mut Table) {
        let Some(col) = table.column_index(VALUE_CHANGE) else {
            return;
        };
        for row in 0..table.len() {
            if table.value(row, col).abs() > self.limit {
                table.set_value(row, col, 0.0);
            }
        }
    }
}

pub fn finalize(table: &mut Table, ratios: &[RatioMetric], guard: &ValueChangeGuard) {
    apply_ratios(table, ratios);
    table.replace_non_finite();
    guard.apply(table);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[f64]]) -> Table {
        let mut t = Table::zeroed(columns.iter().map(|s| s.to_string()).collect(), rows.len());
        for (r, values) in rows.iter().enumerate() {
            for (c, v) in values.iter().enumerate() {
                t.set_value(r, c, *v);
            }
        }
        t
    }

    #[test]
    fn zero_over_zero_becomes_zero() {
        let mut t = table(&["passes_completed", "passes"], &[&[0.0, 0.0], &[30.0, 40.0]]);
        let ratios = [RatioMetric::new("passes_pct", &["passes_completed"], &["passes"])];
        finalize(&mut t, &ratios, &ValueChangeGuard::default());
        assert_eq!(t.column("passes_pct").unwrap(), vec![0.0, 0.75]);
    }

    #[test]
    fn summed_denominators() {
        let mut t = table(&["aerials_won", "aerials_lost"], &[&[3.0, 1.0]]);
        let ratios = [RatioMetric::new(
            "aerials_won_pct",
            &["aerials_won"],
            &["aerials_won", "aerials_lost"],
        )];
        apply_ratios(&mut t, &ratios);
        assert_eq!(t.get(0, "aerials_won_pct"), Some(0.75));
    }

    #[test]
    fn missing_inputs_skip_the_ratio() {
        let mut t = table(&["saves"], &[&[4.0]]);
        let ratios = [RatioMetric::new("save_pct", &["saves"], &["shots_on_target_against"])];
        apply_ratios(&mut t, &ratios);
        assert!(!t.has_column("save_pct"));
    }

    #[test]
    fn guard_resets_large_moves_only() {
        let mut t = table(&["value_change"], &[&[55.0], &[-31.0], &[-2.0], &[30.0]]);
        ValueChangeGuard::default().apply(&mut t);
        assert_eq!(t.column("value_change").unwrap(), vec![0.0, 0.0, -2.0, 30.0]);

        let mut t = table(&["value_change"], &[&[5.0]]);
        ValueChangeGuard::new(4.0).apply(&mut t);
        assert_eq!(t.get(0, "value_change"), Some(0.0));
    }
}
