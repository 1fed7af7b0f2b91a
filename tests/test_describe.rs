//! Tests for field distribution summaries

use capstat::pipeline::describe::DistributionShape;
use capstat::pipeline::{
    clean_dataset, describe_field, CleanerConfig, DescribeField, PipelineError, PlotKind,
};
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

fn cleaned_players(n: usize) -> DataFrame {
    clean_dataset(&common::create_player_dataframe(n), &CleanerConfig::default())
        .unwrap()
        .df
}

#[test]
fn test_histogram_counts_sum_to_n() {
    let df = cleaned_players(64);

    for field in [DescribeField::Age, DescribeField::Points] {
        let dist = describe_field(&df, field.column(), PlotKind::Histogram, None).unwrap();
        match &dist.shape {
            DistributionShape::Histogram { bins } => {
                // Sturges: ceil(log2 64) + 1
                assert_eq!(bins.len(), 7);
                assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 64);
            }
            other => panic!("expected histogram, got {:?}", other),
        }
    }
}

#[test]
fn test_bin_override() {
    let df = df! { "x" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0] }.unwrap();

    let dist = describe_field(&df, "x", PlotKind::Histogram, Some(3)).unwrap();
    match dist.shape {
        DistributionShape::Histogram { bins } => {
            let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
            // Edges at 1, 2.667, 4.333, 6
            assert_eq!(counts, vec![2, 2, 2]);
        }
        other => panic!("expected histogram, got {:?}", other),
    }
}

#[test]
fn test_density_integrates_to_one() {
    let df = cleaned_players(80);

    let dist = describe_field(&df, "Salary", PlotKind::Density, None).unwrap();
    match &dist.shape {
        DistributionShape::Density { bandwidth, x, y } => {
            assert!(*bandwidth > 0.0);
            assert_eq!(x.len(), 512);
            let step = x[1] - x[0];
            let area: f64 = y.iter().sum::<f64>() * step;
            assert!((area - 1.0).abs() < 0.01, "area = {}", area);
        }
        other => panic!("expected density, got {:?}", other),
    }
}

#[test]
fn test_summary_statistics() {
    let df = df! { "x" => [Some(2.0f64), None, Some(4.0), Some(9.0)] }.unwrap();

    let dist = describe_field(&df, "x", PlotKind::Histogram, None).unwrap();

    assert_eq!(dist.summary.n, 3);
    assert_eq!(dist.summary.mean, 5.0);
    assert_eq!(dist.summary.median, 4.0);
    assert_eq!(dist.summary.min, 2.0);
    assert_eq!(dist.summary.max, 9.0);
}

#[test]
fn test_unknown_field() {
    let df = cleaned_players(10);

    let err = describe_field(&df, "Nope", PlotKind::Histogram, None).unwrap_err();
    assert!(matches!(err, PipelineError::FieldNotFound(ref f) if f == "Nope"));
}

#[test]
fn test_all_null_field_is_insufficient() {
    let df = df! { "x" => [None::<f64>, None] }.unwrap();

    let err = describe_field(&df, "x", PlotKind::Density, None).unwrap_err();
    assert!(matches!(err, PipelineError::InsufficientData(_)));
}

#[test]
fn test_standard_fields_render() {
    let df = cleaned_players(40);

    for field in DescribeField::ALL {
        let dist = describe_field(&df, field.column(), field.default_kind(), None).unwrap();
        let text = dist.render_text(30);
        assert!(text.contains(field.column()));

        let svg = dist.to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}

#[test]
fn test_describe_does_not_modify_table() {
    let df = cleaned_players(20);
    let before = df.clone();

    describe_field(&df, "toi_per_game", PlotKind::Density, None).unwrap();

    assert!(df.equals_missing(&before));
}
