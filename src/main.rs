use std::time::Instant;

use anyhow::{Context, Result};
use tracing::warn;

use pl_features::config::BuildConfig;
use pl_features::dataset::{self, FeatureSet};
use pl_features::export;
use pl_features::schema::Schema;
use pl_features::store::FsStore;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut config = BuildConfig::from_env();
    config.apply_args(&args)?;

    let store = FsStore::new(&config.data_dir);
    let schema = load_schema(&store)?;
    let features = FeatureSet::standard().context("invalid built-in feature set")?;

    let started = Instant::now();
    let dataset = dataset::build_dataset(&store, &schema, features, &config.options)?;
    let report = export::write_dataset(&dataset, &config.output)?;

    println!("Dataset build complete");
    println!("Data: {}", config.data_dir.display());
    println!("Feature gameweeks: {:?}", config.options.gameweeks);
    println!("Label gameweeks: {:?}", config.options.label_range());
    for summary in &dataset.summaries {
        println!(
            " - {}: {} fixtures, {} label fixtures, {} teams, {} players",
            summary.season, summary.fixtures, summary.label_fixtures, summary.teams, summary.players
        );
    }
    println!(
        "Rows: {} x {} columns -> {} ({:?})",
        report.rows,
        report.columns,
        report.path.display(),
        report.format
    );
    println!("Elapsed: {:.2}s", started.elapsed().as_secs_f64());

    Ok(())
}

fn load_schema(store: &FsStore) -> Result<Schema> {
    let schema = store.header_schema().context("failed reading header schema")?;
    Ok(schema.unwrap_or_else(|| {
        warn!(root = %store.root().display(), "header files missing, using built-in schema");
        Schema::premier_league()
    }))
}
