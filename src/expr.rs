use std::fmt;
use std::str::FromStr;

use crate::table::Table;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    #[error("malformed expression {expr:?}: {reason}")]
    Syntax { expr: String, reason: String },

    #[error("unknown operator {op:?} in {expr:?}")]
    UnknownOperator { expr: String, op: String },

    #[error("column {column} used by {expr:?} does not exist")]
    UnknownColumn { expr: String, column: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Op::Add => lhs + rhs,
            Op::Sub => lhs - rhs,
            Op::Mul => lhs * rhs,
            Op::Div => lhs / rhs,
        }
    }

    fn symbol(self) -> char {
        match self {
            Op::Add => '+',
            Op::Sub => '-',
            Op::Mul => '*',
            Op::Div => '/',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnExpr {
    pub name: String,
    pub base: String,
    pub steps: Vec<(Op, String)>,
}

impl ColumnExpr {
    pub fn parse(expr: &str) -> Result<Self, ExprError> {
        let syntax = |reason: &str| ExprError::Syntax {
            expr: expr.to_string(),
            reason: reason.to_string(),
        };
        let (name, formula) = expr.split_once('=').ok_or_else(|| syntax("expected `name = formula`"))?;
        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(syntax("bad column name"));
        }
        let mut tokens = formula.split_whitespace();
        let base = tokens.next().ok_or_else(|| syntax("empty formula"))?;
        let mut steps = Vec::new();
        while let Some(op) = tokens.next() {
            let op = match op {
                "+" => Op::Add,
                "-" => Op::Sub,
                "*" => Op::Mul,
                "/" => Op::Div,
                other => {
                    return Err(ExprError::UnknownOperator {
                        expr: expr.to_string(),
                        op: other.to_string(),
                    });
                }
            };
            let operand = tokens.next().ok_or_else(|| syntax("operator without operand"))?;
            steps.push((op, operand.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            base: base.to_string(),
            steps,
        })
    }

    pub fn inputs(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.base.as_str()).chain(self.steps.iter().map(|(_, c)| c.as_str()))
    }

    pub fn apply(&self, table: &mut Table) -> Result<(), ExprError> {
        let mut cols = Vec::with_capacity(self.steps.len() + 1);
        for column in self.inputs() {
            let idx = table.column_index(column).ok_or_else(|| ExprError::UnknownColumn {
                expr: self.to_string(),
                column: column.to_string(),
            })?;
            cols.push(idx);
        }
        let values: Vec<f64> = (0..table.len())
            .map(|row| {
                let mut acc = table.value(row, cols[0]);
                for ((op, _), col) in self.steps.iter().zip(&cols[1..]) {
                    acc = op.apply(acc, table.value(row, *col));
                }
                if acc.is_finite() { acc } else { 0.0 }
            })
            .collect();
        table.set_column(&self.name, &values);
        Ok(())
    }
}

impl FromStr for ColumnExpr {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ColumnExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.base)?;
        for (op, column) in &self.steps {
            write!(f, " {} {column}", op.symbol())?;
        }
        Ok(())
    }
}

/// Applies expressions in order; later ones may read columns earlier ones wrote.
pub fn apply_all(exprs: &[ColumnExpr], table: &mut Table) -> Result<(), ExprError> {
    for expr in exprs {
        expr.apply(table)?;
    }
    Ok(())
}
