//! Rank transforms and term-association scores.

/// Dense ranks (1-based, ascending, ties share a rank).
pub fn dense_rank(values: &[f64]) -> Vec<f64> {
    let mut distinct: Vec<f64> = values.to_vec();
    distinct.sort_by(|a, b| a.total_cmp(b));
    distinct.dedup();
    values
        .iter()
        .map(|v| {
            let pos = distinct.partition_point(|d| d.total_cmp(v).is_lt());
            (pos + 1) as f64
        })
        .collect()
}

/// Average ranks (1-based, ascending, ties get the mean of their ranks).
pub fn average_rank(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        i = j + 1;
    }
    ranks
}

/// Min-max scale into [0, 1]; constant input maps to 0.5.
pub fn min_max_scale(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(max > min) {
        return vec![0.5; values.len()];
    }
    values.iter().map(|v| (v - min) / (max - min)).collect()
}

/// Rank difference between two count vectors: each side's dense rank
/// divided by its maximum rank, category minus rest.
pub fn rank_difference(category: &[f64], rest: &[f64]) -> Vec<f64> {
    let a = dense_rank(category);
    let b = dense_rank(rest);
    let max_a = a.iter().copied().fold(1.0, f64::max);
    let max_b = b.iter().copied().fold(1.0, f64::max);
    a.iter().zip(&b).map(|(x, y)| x / max_a - y / max_b).collect()
}

/// Scaled F-score in [-1, 1]: positive when a term leans toward the
/// category, negative when it leans toward the rest.
pub fn scaled_f_score(category: &[f64], rest: &[f64], beta: f64) -> Vec<f64> {
    let cat = one_sided_f_score(category, rest, beta);
    let not_cat = one_sided_f_score(rest, category, beta);
    cat.iter()
        .zip(&not_cat)
        .map(|(&c, &n)| {
            if c > n {
                c
            } else if c < n {
                -n
            } else {
                0.0
            }
        })
        .collect()
}

/// Harmonic mean of normal-CDF-scaled precision P(cat | term) and recall
/// P(term | cat).
fn one_sided_f_score(a: &[f64], b: &[f64], beta: f64) -> Vec<f64> {
    let total: f64 = a.iter().sum();
    let precision: Vec<f64> = a
        .iter()
        .zip(b)
        .map(|(x, y)| if x + y > 0.0 { x / (x + y) } else { 0.0 })
        .collect();
    let recall: Vec<f64> = a
        .iter()
        .map(|x| if total > 0.0 { x / total } else { 0.0 })
        .collect();
    let p = normcdf_scale(&precision);
    let r = normcdf_scale(&recall);
    p.iter().zip(&r).map(|(&p, &r)| weighted_hmean(p, r, beta)).collect()
}

fn weighted_hmean(p: f64, r: f64, beta: f64) -> f64 {
    let b2 = beta * beta;
    let denom = b2 * p + r;
    if denom > 0.0 {
        (1.0 + b2) * p * r / denom
    } else {
        0.0
    }
}

/// Map each value through the normal CDF fitted to the vector's mean and
/// population standard deviation.
pub fn normcdf_scale(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    if std == 0.0 {
        return vec![0.5; values.len()];
    }
    values
        .iter()
        .map(|v| 0.5 * (1.0 + erf((v - mean) / (std * std::f64::consts::SQRT_2))))
        .collect()
}

/// Abramowitz & Stegun 7.1.26 (|error| < 1.5e-7).
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.327_591_1 * x);
    let poly = t
        * (0.254_829_592
            + t * (-0.284_496_736 + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429))));
    sign * (1.0 - poly * (-x * x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dense_and_average_rank() {
        let v = [10.0, 3.0, 10.0, 7.0];
        assert_eq!(dense_rank(&v), vec![3.0, 1.0, 3.0, 2.0]);
        assert_eq!(average_rank(&v), vec![3.5, 1.0, 3.5, 2.0]);
    }

    #[test]
    fn test_min_max_scale() {
        assert_eq!(min_max_scale(&[1.0, 2.0, 3.0]), vec![0.0, 0.5, 1.0]);
        assert_eq!(min_max_scale(&[4.0, 4.0]), vec![0.5, 0.5]);
    }

    #[test]
    fn test_erf_reference_values() {
        assert!(erf(0.0).abs() < 1e-7);
        assert!((erf(1.0) - 0.842_700_79).abs() < 1e-6);
        assert!((erf(-1.0) + 0.842_700_79).abs() < 1e-6);
    }

    #[test]
    fn test_scaled_f_score_sign_follows_association() {
        // term 0 only in category, term 1 only in rest, term 2 balanced
        let cat = [30.0, 0.0, 10.0];
        let rest = [0.0, 30.0, 10.0];
        let s = scaled_f_score(&cat, &rest, 1.0);
        assert!(s[0] > 0.0);
        assert!(s[1] < 0.0);
        assert!((s[0] + s[1]).abs() < 1e-9, "mirror-image counts score symmetrically");
        assert!(s.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_rank_difference_range() {
        let d = rank_difference(&[5.0, 1.0, 0.0], &[0.0, 1.0, 5.0]);
        assert!(d[0] > 0.0 && d[2] < 0.0);
        assert!(d.iter().all(|v| (-1.0..=1.0).contains(v)));
    }
}
