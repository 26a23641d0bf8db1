//! Property tests for the imbalance analysis.

use imbalance_viewer::analysis::{ClassLabel, analyze};
use imbalance_viewer::data::model::{CellValue, TabularDataset};
use proptest::prelude::*;

/// A `Class` column built from per-class sizes, interleaved so row order is
/// not simply grouped by class.
fn dataset_from_sizes(sizes: &[usize]) -> TabularDataset {
    let mut values = Vec::new();
    let longest = sizes.iter().copied().max().unwrap_or(0);
    for round in 0..longest {
        for (class, &size) in sizes.iter().enumerate() {
            if round < size {
                values.push(CellValue::Integer(class as i64));
            }
        }
    }
    TabularDataset::from_column("Class", values)
}

fn class_sizes() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..200, 2..8)
}

proptest! {
    #[test]
    fn percentages_sum_to_one_hundred(sizes in class_sizes()) {
        let result = analyze(&dataset_from_sizes(&sizes), "Class").unwrap();
        let sum: f64 = result.class_details.iter().map(|d| d.percentage).sum();
        prop_assert!((sum - 100.0).abs() < 1e-9, "sum was {sum}");
    }

    #[test]
    fn analysis_is_deterministic(sizes in class_sizes()) {
        let ds = dataset_from_sizes(&sizes);
        prop_assert_eq!(analyze(&ds, "Class").unwrap(), analyze(&ds, "Class").unwrap());
    }

    #[test]
    fn metrics_match_the_input(sizes in class_sizes()) {
        let ds = dataset_from_sizes(&sizes);
        let result = analyze(&ds, "Class").unwrap();
        let m = &result.metrics;

        prop_assert_eq!(m.total_samples, ds.len());
        prop_assert_eq!(m.num_classes, sizes.len());
        prop_assert_eq!(result.class_details.len(), sizes.len());

        let min = *sizes.iter().min().unwrap() as f64;
        let max = *sizes.iter().max().unwrap() as f64;
        let total = ds.len() as f64;
        prop_assert!((m.degree_of_imbalance - min / total).abs() < 1e-12);
        prop_assert!((m.distribution_difference - (max - min) / total * 100.0).abs() < 1e-9);
        prop_assert!((0.0..=1.0).contains(&m.degree_of_imbalance));
        prop_assert!((0.0..=100.0).contains(&m.distribution_difference));
    }

    #[test]
    fn details_are_sorted_and_labelled(sizes in class_sizes()) {
        let result = analyze(&dataset_from_sizes(&sizes), "Class").unwrap();
        let details = &result.class_details;

        prop_assert!(details.windows(2).all(|w| w[0].count >= w[1].count));
        prop_assert!(details[0].is_majority);
        prop_assert!(details[details.len() - 1].is_minority);
        for d in details {
            let expected = if d.is_majority {
                Some(ClassLabel::Majority)
            } else if d.is_minority {
                Some(ClassLabel::Minority)
            } else {
                None
            };
            prop_assert_eq!(d.label, expected);
        }
    }
}
