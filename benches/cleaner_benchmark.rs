//! Benchmarks for cleaning raw player tables and fitting the salary models
//!
//! Run with: cargo bench --bench cleaner_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use polars::prelude::*;
use rand::prelude::*;
use rand::SeedableRng;

use capstat::pipeline::{
    clean_dataset, fit_model, CleanerConfig, ModelFamily, ModelSpec, TreeConfig,
};

const TEAMS: [&str; 8] = ["EDM", "TOR", "BOS", "CHI", "VAN", "DAL", "TOT", "MTL"];
const POSITIONS: [&str; 4] = ["C", "LW", "RW", "D"];

/// Generate a raw player table with every input column
fn generate_raw_players(n_rows: usize, seed: u64) -> DataFrame {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let games: Vec<i64> = (0..n_rows).map(|_| rng.gen_range(0..=82)).collect();
    let goals: Vec<i64> = (0..n_rows).map(|_| rng.gen_range(0..45)).collect();
    let assists: Vec<i64> = (0..n_rows).map(|_| rng.gen_range(0..60)).collect();
    let toi: Vec<i64> = games.iter().map(|&g| g * rng.gen_range(10..24)).collect();
    let position: Vec<&str> = (0..n_rows).map(|i| POSITIONS[i % 4]).collect();

    let int_col = |name: &str, rng: &mut StdRng, hi: i64| {
        Column::new(
            name.into(),
            (0..n_rows).map(|_| rng.gen_range(0..hi)).collect::<Vec<i64>>(),
        )
    };
    let flag_col = |name: &str| {
        Column::new(
            name.into(),
            position.iter().map(|p| (*p == name) as i64).collect::<Vec<i64>>(),
        )
    };

    let columns = vec![
        Column::new("Rk".into(), (1..=n_rows as i64).collect::<Vec<i64>>()),
        Column::new(
            "Player".into(),
            (0..n_rows).map(|i| format!("Player {}", i)).collect::<Vec<String>>(),
        ),
        Column::new(
            "Age".into(),
            (0..n_rows).map(|_| rng.gen_range(19..40)).collect::<Vec<i64>>(),
        ),
        Column::new(
            "Tm".into(),
            (0..n_rows).map(|i| TEAMS[i % TEAMS.len()]).collect::<Vec<&str>>(),
        ),
        Column::new("Pos".into(), position.clone()),
        Column::new("GP".into(), games.clone()),
        Column::new("G".into(), goals.clone()),
        Column::new("A".into(), assists.clone()),
        Column::new(
            "PTS".into(),
            goals.iter().zip(&assists).map(|(g, a)| g + a).collect::<Vec<i64>>(),
        ),
        Column::new(
            "+/-".into(),
            (0..n_rows).map(|_| rng.gen_range(-30..30)).collect::<Vec<i64>>(),
        ),
        int_col("PIM", &mut rng, 120),
        int_col("EVG", &mut rng, 30),
        int_col("PPG", &mut rng, 15),
        int_col("SHG", &mut rng, 3),
        int_col("EVA", &mut rng, 40),
        int_col("PPA", &mut rng, 20),
        int_col("SHA", &mut rng, 3),
        int_col("S", &mut rng, 300),
        Column::new(
            "S%".into(),
            (0..n_rows).map(|_| rng.gen::<f64>() * 20.0).collect::<Vec<f64>>(),
        ),
        Column::new("TOI".into(), toi),
        Column::new(
            "ATOI".into(),
            (0..n_rows)
                .map(|_| format!("{}:{:02}", rng.gen_range(8..26), rng.gen_range(0..60)))
                .collect::<Vec<String>>(),
        ),
        int_col("BLK", &mut rng, 150),
        int_col("HIT", &mut rng, 250),
        int_col("FOW", &mut rng, 900),
        int_col("FOL", &mut rng, 900),
        Column::new(
            "FO%".into(),
            (0..n_rows).map(|_| rng.gen::<f64>() * 100.0).collect::<Vec<f64>>(),
        ),
        Column::new(
            "Salary".into(),
            (0..n_rows)
                .map(|_| rng.gen_range(750_000..12_000_000))
                .collect::<Vec<i64>>(),
        ),
        Column::new(
            "Handed".into(),
            (0..n_rows)
                .map(|_| if rng.gen_bool(0.6) { "L" } else { "R" })
                .collect::<Vec<&str>>(),
        ),
        flag_col("C"),
        flag_col("LW"),
        flag_col("RW"),
        flag_col("D"),
    ];

    DataFrame::new(columns).expect("Failed to create DataFrame")
}

/// Benchmark the cleaner across table sizes
fn benchmark_cleaning(c: &mut Criterion) {
    let mut group = c.benchmark_group("clean_dataset");
    let config = CleanerConfig::default();

    for n_rows in [1_000, 10_000, 50_000] {
        let df = generate_raw_players(n_rows, 42);
        group.throughput(Throughput::Elements(n_rows as u64));

        group.bench_with_input(BenchmarkId::from_parameter(n_rows), &df, |b, df| {
            b.iter(|| clean_dataset(black_box(df), black_box(&config)).unwrap())
        });
    }

    group.finish();
}

/// Benchmark OLS against tree fitting on the cleaned table
fn benchmark_models(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_model");
    group.sample_size(20);

    let cleaned = clean_dataset(&generate_raw_players(5_000, 7), &CleanerConfig::default())
        .expect("Failed to clean benchmark table");

    let specs = [
        ModelSpec::new("ols", ModelFamily::Ols, "Salary"),
        ModelSpec::new("tree", ModelFamily::RegressionTree, "Salary")
            .with_tree_config(TreeConfig::with_min_split(20)),
        ModelSpec::new("tree_fine", ModelFamily::RegressionTree, "Salary")
            .with_tree_config(TreeConfig::with_min_split(5)),
    ];

    for spec in &specs {
        group.bench_with_input(BenchmarkId::new("salary", &spec.name), spec, |b, spec| {
            b.iter(|| fit_model(black_box(&cleaned.df), black_box(spec)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_cleaning, benchmark_models);
criterion_main!(benches);
