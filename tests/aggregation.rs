mod common;

use rcountries::clean;
use rcountries::models::DensityBin;
use rcountries::stats::{density_pivot, subregion_summary};

#[test]
fn fixture_subregion_summary() {
    let rows = clean::clean(&common::fixture_table()).unwrap().rows;
    let summary = subregion_summary(&rows);
    let names: Vec<&str> = summary.iter().map(|s| s.subregion.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Central Europe",
            "Northern Europe",
            "Southern Europe",
            "Western Europe"
        ]
    );

    let central = &summary[0];
    assert_eq!(central.count, 1);
    assert_eq!(central.mean_pop, 37_950_802.0);
    assert_eq!(central.max_pop, 37_950_802.0);

    let northern = &summary[1];
    assert_eq!(northern.count, 5);
    assert_eq!(northern.max_pop, 10_353_442.0);
    let expected_mean = (10_353_442.0 + 5_379_475.0 + 5_530_719.0 + 366_425.0 + 4_994_724.0) / 5.0;
    assert!((northern.mean_pop - expected_mean).abs() < 1e-6);

    assert_eq!(summary[3].max_pop, 83_240_525.0);
}

#[test]
fn pivot_rows_sum_to_subregion_counts() {
    let rows = clean::clean(&common::fixture_table()).unwrap().rows;
    let pivot = density_pivot(&rows);
    let summary = subregion_summary(&rows);

    assert_eq!(pivot.subregions.len(), summary.len());
    for (i, s) in summary.iter().enumerate() {
        assert_eq!(pivot.subregions[i], s.subregion);
        assert_eq!(pivot.row_total(i) as usize, s.count);
    }
    let total: u32 = (0..pivot.subregions.len()).map(|i| pivot.row_total(i)).sum();
    assert_eq!(total as usize, rows.len());
}

#[test]
fn pivot_fills_absent_combinations_with_zero() {
    let rows = clean::clean(&common::fixture_table()).unwrap().rows;
    let pivot = density_pivot(&rows);

    assert_eq!(pivot.get("Northern Europe", DensityBin::VeryLow), Some(4));
    assert_eq!(pivot.get("Northern Europe", DensityBin::Low), Some(1));
    assert_eq!(pivot.get("Northern Europe", DensityBin::VeryHigh), Some(0));
    assert_eq!(pivot.get("Central Europe", DensityBin::Medium), Some(1));
    assert_eq!(pivot.get("Central Europe", DensityBin::High), Some(0));
    assert_eq!(pivot.get("Western Europe", DensityBin::VeryHigh), Some(2));
    assert_eq!(pivot.get("Atlantis", DensityBin::Low), None);
    assert_eq!(pivot.max_count(), 4);
}

#[test]
fn empty_input_gives_empty_aggregates() {
    assert!(subregion_summary(&[]).is_empty());
    let pivot = density_pivot(&[]);
    assert!(pivot.is_empty());
    assert_eq!(pivot.max_count(), 0);
}
