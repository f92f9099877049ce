use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<f64>>,
}

impl Table {
    pub fn zeroed(columns: Vec<String>, rows: usize) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        let width = columns.len();
        Self {
            columns,
            index,
            rows: vec![vec![0.0; width]; rows],
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.rows[row]
    }

    pub fn get(&self, row: usize, name: &str) -> Option<f64> {
        let col = self.column_index(name)?;
        self.rows.get(row).map(|r| r[col])
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.rows[row][col]
    }

    pub fn set_value(&mut self, row: usize, col: usize, value: f64) {
        self.rows[row][col] = value;
    }

    pub fn add_value(&mut self, row: usize, col: usize, delta: f64) {
        self.rows[row][col] += delta;
    }

    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        let idx = self.columns.len();
        self.columns.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        for row in &mut self.rows {
            row.push(0.0);
        }
        idx
    }

    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let col = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[col]).collect())
    }

    pub fn set_column(&mut self, name: &str, values: &[f64]) {
        let col = self.ensure_column(name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[col] = *value;
        }
    }

    pub fn column_sum(&self, name: &str) -> f64 {
        match self.column_index(name) {
            Some(col) => self.rows.iter().map(|r| r[col]).sum(),
            None => 0.0,
        }
    }

    pub fn replace_non_finite(&mut self) {
        for row in &mut self.rows {
            for value in row.iter_mut() {
                if !value.is_finite() {
                    *value = 0.0;
                }
            }
        }
    }
}
