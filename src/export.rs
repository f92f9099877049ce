use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use rusqlite::types::{ToSql, ToSqlOutput};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::dataset::{Cell, Dataset};

pub const SQLITE_TABLE: &str = "dataset";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Xlsx,
    Sqlite,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            "sqlite" | "sqlite3" | "db" => Ok(Self::Sqlite),
            other => bail!(
                "unsupported output extension {other:?} for {} (csv, xlsx, sqlite, db)",
                path.display()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub rows: usize,
    pub columns: usize,
}

pub fn write_dataset(dataset: &Dataset, path: &Path) -> Result<ExportReport> {
    let format = OutputFormat::from_path(path)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating {}", parent.display()))?;
    }
    match format {
        OutputFormat::Csv => write_csv(dataset, path)?,
        OutputFormat::Xlsx => write_xlsx(dataset, path)?,
        OutputFormat::Sqlite => write_sqlite(dataset, path)?,
    }
    Ok(ExportReport {
        path: path.to_path_buf(),
        format,
        rows: dataset.len(),
        columns: dataset.columns.len(),
    })
}

fn write_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("failed opening {}", path.display()))?;
    for row in dataset.string_rows() {
        writer.write_record(&row).context("write csv record")?;
    }
    writer
        .flush()
        .with_context(|| format!("failed writing csv to {}", path.display()))?;
    Ok(())
}

fn write_xlsx(dataset: &Dataset, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Dataset")?;
        write_rows(sheet, dataset)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

fn write_rows(worksheet: &mut Worksheet, dataset: &Dataset) -> Result<()> {
    for (col_idx, name) in dataset.columns.iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16, name)
            .with_context(|| format!("write header ({col_idx})"))?;
    }
    for (row_idx, row) in dataset.rows.iter().enumerate() {
        let r = row_idx as u32 + 1;
        for (col_idx, cell) in row.iter().enumerate() {
            let c = col_idx as u16;
            let written = match cell {
                Cell::Text(s) => worksheet.write_string(r, c, s),
                Cell::Number(v) => worksheet.write_number(r, c, *v),
                Cell::Flag(b) => worksheet.write_boolean(r, c, *b),
            };
            written.with_context(|| format!("write cell ({r},{c})"))?;
        }
    }
    Ok(())
}

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Text(s) => ToSqlOutput::from(s.as_str()),
            Cell::Number(v) => ToSqlOutput::from(*v),
            Cell::Flag(b) => ToSqlOutput::from(*b),
        })
    }
}

fn sql_type(dataset: &Dataset, col: usize) -> &'static str {
    match dataset.rows.first().and_then(|row| row.get(col)) {
        Some(Cell::Text(_)) => "TEXT",
        Some(Cell::Flag(_)) => "INTEGER",
        Some(Cell::Number(_)) => "REAL",
        None if col < 3 => "TEXT",
        None => "REAL",
    }
}

fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn write_sqlite(dataset: &Dataset, path: &Path) -> Result<()> {
    let mut conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    let defs: Vec<String> = dataset
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| format!("{} {}", quote(name), sql_type(dataset, idx)))
        .collect();
    conn.execute_batch(&format!(
        "DROP TABLE IF EXISTS {table};\nCREATE TABLE {table} ({defs});",
        table = SQLITE_TABLE,
        defs = defs.join(", ")
    ))
    .context("create dataset table")?;

    let placeholders: Vec<String> = (1..=dataset.columns.len()).map(|i| format!("?{i}")).collect();
    let insert = format!(
        "INSERT INTO {SQLITE_TABLE} ({}) VALUES ({})",
        dataset.columns.iter().map(|c| quote(c)).collect::<Vec<_>>().join(", "),
        placeholders.join(", ")
    );
    let tx = conn.transaction().context("begin dataset transaction")?;
    {
        let mut stmt = tx.prepare(&insert).context("prepare dataset insert")?;
        for (idx, row) in dataset.rows.iter().enumerate() {
            stmt.execute(rusqlite::params_from_iter(row.iter()))
                .with_context(|| format!("insert dataset row {idx}"))?;
        }
    }
    tx.commit().context("commit dataset transaction")?;
    Ok(())
}
