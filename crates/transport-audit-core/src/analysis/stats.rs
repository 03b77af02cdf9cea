/// Descriptive statistics shared by the duration and workload analyses.
///
/// Every function returns 0 for degenerate input instead of failing.

/// Worker counts above this use the O(n log n) rank-sum Gini.
const PAIRWISE_GINI_LIMIT: usize = 64;

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divisor `N`); 0 for an empty slice.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Median of an ascending-sorted slice; 0 for an empty slice.
pub fn median_sorted(sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Median of an unsorted slice; 0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    median_sorted(&sorted)
}

/// Gini coefficient of non-negative values.
///
/// 0 when `n <= 1` or the values sum to 0. Small inputs use the direct
/// pairwise definition; larger ones the equivalent rank-sum form.
pub fn gini(values: &[f64]) -> f64 {
    if values.len() <= PAIRWISE_GINI_LIMIT {
        gini_pairwise(values)
    } else {
        gini_rank_sum(values)
    }
}

/// `Σ_i Σ_j |v_i − v_j| / (2 · n · Σv)`.
pub fn gini_pairwise(values: &[f64]) -> f64 {
    let n = values.len();
    let total: f64 = values.iter().sum();
    if n <= 1 || total <= 0.0 {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);

    let mut diff_sum = 0.0;
    for a in &sorted {
        for b in &sorted {
            diff_sum += (a - b).abs();
        }
    }
    diff_sum / (2.0 * n as f64 * total)
}

/// `(2 · Σ i·v_i) / (n · Σv) − (n + 1) / n` over ascending values, 1-indexed.
pub fn gini_rank_sum(values: &[f64]) -> f64 {
    let n = values.len();
    let total: f64 = values.iter().sum();
    if n <= 1 || total <= 0.0 {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);

    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, v)| (i + 1) as f64 * v)
        .sum();
    let n = n as f64;
    (2.0 * weighted) / (n * total) - (n + 1.0) / n
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    // ── mean / std ───────────────────────────────────────────────────────

    #[test]
    fn mean_and_std_of_empty_are_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(population_std_dev(&[]), 0.0);
    }

    /// Divisor is N, not N-1: std of [80, 20] is 30.
    #[test]
    fn std_dev_is_population() {
        assert!((population_std_dev(&[80.0, 20.0]) - 30.0).abs() < EPS);
        assert!((population_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < EPS);
    }

    // ── median ───────────────────────────────────────────────────────────

    #[test]
    fn median_even_and_odd() {
        assert_eq!(median(&[40.0, 10.0, 30.0, 20.0]), 25.0);
        assert_eq!(median(&[30.0, 10.0, 20.0]), 20.0);
        assert_eq!(median(&[]), 0.0);
    }

    // ── gini ─────────────────────────────────────────────────────────────

    #[test]
    fn gini_of_equal_shares_is_zero() {
        assert!(gini(&[25.0, 25.0, 25.0, 25.0]).abs() < EPS);
    }

    /// One worker holding everything gives the maximum `(n-1)/n`.
    #[test]
    fn gini_of_total_concentration_is_maximal() {
        let g = gini(&[100.0, 0.0, 0.0, 0.0]);
        assert!((g - 0.75).abs() < EPS);
    }

    #[test]
    fn gini_degenerate_inputs_are_zero() {
        assert_eq!(gini(&[]), 0.0);
        assert_eq!(gini(&[100.0]), 0.0);
        assert_eq!(gini(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn gini_two_workers_80_20() {
        // |80-20| * 2 / (2 * 2 * 100) = 0.3
        assert!((gini(&[80.0, 20.0]) - 0.3).abs() < EPS);
    }

    /// Both formulations must agree, including above the pairwise cut-over.
    #[test]
    fn gini_formulations_agree() {
        let values: Vec<f64> = (0..200).map(|i| ((i * 37) % 101) as f64).collect();
        assert!((gini_pairwise(&values) - gini_rank_sum(&values)).abs() < 1e-9);
        assert!((gini(&values) - gini_pairwise(&values)).abs() < 1e-9);
    }
}
