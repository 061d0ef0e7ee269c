//! Derived series shared by the chart transforms.

/// Trailing moving average. Entries before the first full window are `None`.
pub fn trailing_moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let sparse: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
    trailing_moving_average_sparse(&sparse, window)
}

/// Trailing moving average over a series with gaps.
///
/// A window containing a gap has no average, the same way a missing value
/// poisons a sum.
pub fn trailing_moving_average_sparse(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let sum = slice.iter().try_fold(0.0, |acc, v| v.map(|v| acc + v))?;
            Some(sum / window as f64)
        })
        .collect()
}

/// Express every value relative to the first one, scaled so the first is 100.
///
/// Returns `None` for an empty series or a zero base.
pub fn index_series(values: &[f64]) -> Option<Vec<f64>> {
    let base = *values.first()?;
    if base == 0.0 {
        return None;
    }
    Some(values.iter().map(|v| v / base * 100.0).collect())
}

/// `current / max * 100`. Not clamped: over-allocation reads above 100.
pub fn percentage_of(current: f64, max: f64) -> f64 {
    current / max * 100.0
}

/// Keep the `n` largest items by `key`, sorted descending.
pub fn top_n_by<T, F>(mut items: Vec<T>, n: usize, key: F) -> Vec<T>
where
    F: Fn(&T) -> f64,
{
    items.sort_by(|a, b| key(b).total_cmp(&key(a)));
    items.truncate(n);
    items
}

/// `(min, max)` of the values, or `None` when empty.
pub fn extent<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_average_window() {
        let values: Vec<f64> = (1..=12).map(f64::from).collect();
        let ma = trailing_moving_average(&values, 10);
        assert!(ma[..9].iter().all(Option::is_none));
        // mean of 1..=10
        assert!((ma[9].unwrap() - 5.5).abs() < 1e-12);
        // mean of 3..=12
        assert!((ma[11].unwrap() - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_moving_average_matches_window_mean_everywhere() {
        let values: Vec<f64> = (0..40).map(|i| ((i * 37) % 11) as f64 * 1.5).collect();
        let ma = trailing_moving_average(&values, 10);
        for i in 9..values.len() {
            let mean = values[i - 9..=i].iter().sum::<f64>() / 10.0;
            assert!((ma[i].unwrap() - mean).abs() < 1e-9, "index {i}");
        }
    }

    #[test]
    fn test_sparse_gap_poisons_window() {
        let mut values: Vec<Option<f64>> = (0..15).map(|i| Some(i as f64)).collect();
        values[5] = None;
        let ma = trailing_moving_average_sparse(&values, 10);
        // windows covering index 5 are undefined
        assert!(ma[9..=14].iter().all(Option::is_none));

        let values: Vec<Option<f64>> = (0..21).map(|i| Some(i as f64)).collect();
        let ma = trailing_moving_average_sparse(&values, 10);
        assert!(ma[20].is_some());
    }

    #[test]
    fn test_short_series_has_no_average() {
        let ma = trailing_moving_average(&[1.0, 2.0, 3.0], 10);
        assert_eq!(ma, vec![None, None, None]);
        assert!(trailing_moving_average(&[], 10).is_empty());
    }

    #[test]
    fn test_index_base_is_exactly_100() {
        let idx = index_series(&[1234.5, 2469.0, 617.25]).unwrap();
        assert_eq!(idx[0], 100.0);
        assert!((idx[1] - 200.0).abs() < 1e-9);
        assert!((idx[2] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_index_rejects_empty_and_zero_base() {
        assert!(index_series(&[]).is_none());
        assert!(index_series(&[0.0, 5.0]).is_none());
    }

    #[test]
    fn test_percentage_unclamped() {
        assert!((percentage_of(1.5, 3.0) - 50.0).abs() < 1e-12);
        assert!((percentage_of(4.5, 3.0) - 150.0).abs() < 1e-12);
    }

    #[test]
    fn test_top_n_sorted_descending() {
        let items = vec![("a", 12.0), ("b", 40.0), ("c", 25.0), ("d", 11.0)];
        let top = top_n_by(items, 3, |(_, v)| *v);
        let names: Vec<&str> = top.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_extent() {
        assert_eq!(extent([3.0, -1.0, 7.5]), Some((-1.0, 7.5)));
        assert_eq!(extent(std::iter::empty()), None);
    }
}
