//! Exact t-SNE projection to two dimensions.
//!
//! O(n²) per iteration; the indexed corpus is a few thousand abstracts at
//! most. Optimisation follows the usual schedule: early exaggeration with
//! momentum 0.5, then plain gradient descent with momentum 0.8, both with
//! per-coordinate adaptive gains.

use abstracta_common::settings::TsneSettings;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

const EARLY_EXAGGERATION: f64 = 12.0;
const EXAGGERATION_ITERS: usize = 250;
const INITIAL_MOMENTUM: f64 = 0.5;
const FINAL_MOMENTUM: f64 = 0.8;
const MIN_GAIN: f64 = 0.01;
const INIT_STD: f64 = 1e-4;
const PERPLEXITY_TOLERANCE: f64 = 1e-5;
const PERPLEXITY_STEPS: usize = 100;

#[derive(Debug, Clone)]
pub struct Tsne {
    pub perplexity: f64,
    pub seed: u64,
    /// `None` means max(n / early_exaggeration / 4, 50).
    pub learning_rate: Option<f64>,
    pub iterations: usize,
}

impl Default for Tsne {
    fn default() -> Self {
        Self::from_settings(&TsneSettings::default())
    }
}

impl Tsne {
    pub fn from_settings(cfg: &TsneSettings) -> Self {
        Self {
            perplexity: cfg.perplexity,
            seed: cfg.seed,
            learning_rate: cfg.learning_rate,
            iterations: cfg.iterations,
        }
    }

    /// Perplexity actually used for `n` points; must stay below n - 1.
    pub fn effective_perplexity(&self, n: usize) -> f64 {
        let cap = ((n.saturating_sub(1)) as f64 / 3.0).max(1.0);
        self.perplexity.min(cap)
    }

    pub fn effective_learning_rate(&self, n: usize) -> f64 {
        self.learning_rate
            .unwrap_or_else(|| (n as f64 / EARLY_EXAGGERATION / 4.0).max(50.0))
    }

    /// Project `data` (one row per point, equal widths) to 2-D coordinates,
    /// returned in input order.
    pub fn fit(&self, data: &[Vec<f32>]) -> Vec<[f64; 2]> {
        let n = data.len();
        match n {
            0 => return Vec::new(),
            1 => return vec![[0.0, 0.0]],
            _ => {}
        }

        let perplexity = self.effective_perplexity(n);
        let lr = self.effective_learning_rate(n);
        info!(n, perplexity, learning_rate = lr, iterations = self.iterations, "Fitting t-SNE");

        let p = joint_probabilities(&squared_distances(data), perplexity);

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut y: Vec<[f64; 2]> = (0..n)
            .map(|_| [gaussian(&mut rng) * INIT_STD, gaussian(&mut rng) * INIT_STD])
            .collect();
        let mut update = vec![[0.0f64; 2]; n];
        let mut gains = vec![[1.0f64; 2]; n];
        let mut num = vec![0.0f64; n * n];
        let mut grad = vec![[0.0f64; 2]; n];

        for iter in 0..self.iterations {
            let early = iter < EXAGGERATION_ITERS;
            let exaggeration = if early { EARLY_EXAGGERATION } else { 1.0 };
            let momentum = if early { INITIAL_MOMENTUM } else { FINAL_MOMENTUM };

            // Student-t affinities in the embedding.
            let mut sum_q = 0.0;
            for i in 0..n {
                for j in (i + 1)..n {
                    let dx = y[i][0] - y[j][0];
                    let dy = y[i][1] - y[j][1];
                    let q = 1.0 / (1.0 + dx * dx + dy * dy);
                    num[i * n + j] = q;
                    num[j * n + i] = q;
                    sum_q += 2.0 * q;
                }
            }
            let sum_q = sum_q.max(f64::MIN_POSITIVE);

            for (i, g) in grad.iter_mut().enumerate() {
                let mut gx = 0.0;
                let mut gy = 0.0;
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let q_num = num[i * n + j];
                    let mult = (exaggeration * p[i * n + j] - q_num / sum_q) * q_num;
                    gx += mult * (y[i][0] - y[j][0]);
                    gy += mult * (y[i][1] - y[j][1]);
                }
                *g = [4.0 * gx, 4.0 * gy];
            }

            for i in 0..n {
                for d in 0..2 {
                    let same_sign = (grad[i][d] > 0.0) == (update[i][d] > 0.0);
                    gains[i][d] = if same_sign { gains[i][d] * 0.8 } else { gains[i][d] + 0.2 };
                    gains[i][d] = gains[i][d].max(MIN_GAIN);
                    update[i][d] = momentum * update[i][d] - lr * gains[i][d] * grad[i][d];
                    y[i][d] += update[i][d];
                }
            }

            let (mx, my) = y.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
            let (mx, my) = (mx / n as f64, my / n as f64);
            for point in &mut y {
                point[0] -= mx;
                point[1] -= my;
            }

            if (iter + 1) % 250 == 0 {
                debug!(iteration = iter + 1, "t-SNE progress");
            }
        }
        y
    }
}

/// Standard normal draw (Box-Muller).
fn gaussian(rng: &mut StdRng) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

fn squared_distances(data: &[Vec<f32>]) -> Vec<f64> {
    let n = data.len();
    let mut d = vec![0.0f64; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            let dist: f64 = data[i]
                .iter()
                .zip(&data[j])
                .map(|(&a, &b)| {
                    let diff = f64::from(a) - f64::from(b);
                    diff * diff
                })
                .sum();
            d[i * n + j] = dist;
            d[j * n + i] = dist;
        }
    }
    d
}

/// Symmetrised input affinities P (row-major n×n), each row's Gaussian
/// bandwidth found by binary search on the target perplexity.
fn joint_probabilities(dist: &[f64], perplexity: f64) -> Vec<f64> {
    let n = (dist.len() as f64).sqrt() as usize;
    let target_entropy = perplexity.ln();
    let mut cond = vec![0.0f64; n * n];

    for i in 0..n {
        let row = &dist[i * n..(i + 1) * n];
        let mut beta = 1.0f64;
        let mut beta_min = f64::NEG_INFINITY;
        let mut beta_max = f64::INFINITY;

        for _ in 0..PERPLEXITY_STEPS {
            let mut sum_p = 0.0;
            let mut sum_dp = 0.0;
            for (j, &d) in row.iter().enumerate() {
                if j == i {
                    cond[i * n + j] = 0.0;
                    continue;
                }
                let p = (-d * beta).exp();
                cond[i * n + j] = p;
                sum_p += p;
                sum_dp += d * p;
            }
            let sum_p = sum_p.max(1e-12);
            let entropy = sum_p.ln() + beta * sum_dp / sum_p;
            for j in 0..n {
                cond[i * n + j] /= sum_p;
            }

            let diff = entropy - target_entropy;
            if diff.abs() <= PERPLEXITY_TOLERANCE {
                break;
            }
            if diff > 0.0 {
                beta_min = beta;
                beta = if beta_max.is_infinite() { beta * 2.0 } else { (beta + beta_max) / 2.0 };
            } else {
                beta_max = beta;
                beta = if beta_min.is_infinite() { beta / 2.0 } else { (beta + beta_min) / 2.0 };
            }
        }
    }

    let norm = 2.0 * n as f64;
    let mut p = vec![0.0f64; n * n];
    for i in 0..n {
        for j in 0..n {
            if i != j {
                p[i * n + j] = ((cond[i * n + j] + cond[j * n + i]) / norm).max(1e-12);
            }
        }
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_clusters() -> Vec<Vec<f32>> {
        let mut rng = StdRng::seed_from_u64(7);
        let mut data = Vec::new();
        for centre in [0.0f32, 20.0] {
            for _ in 0..12 {
                data.push((0..8).map(|_| centre + rng.gen::<f32>()).collect());
            }
        }
        data
    }

    fn dist(a: [f64; 2], b: [f64; 2]) -> f64 {
        ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
    }

    fn quick() -> Tsne {
        Tsne { iterations: 500, ..Tsne::default() }
    }

    #[test]
    fn test_defaults() {
        let t = Tsne::default();
        assert_eq!(t.seed, 24601);
        assert_eq!(t.perplexity, 30.0);
        assert_eq!(t.effective_learning_rate(120), 50.0);
        assert_eq!(t.effective_learning_rate(4800), 100.0);
        assert!((t.effective_perplexity(24) - 23.0 / 3.0).abs() < 1e-12);
        assert_eq!(t.effective_perplexity(1000), 30.0);
    }

    #[test]
    fn test_conditional_rows_sum_to_one() {
        let data = two_clusters();
        let p = joint_probabilities(&squared_distances(&data), 5.0);
        let n = data.len();
        let total: f64 = p.iter().sum();
        assert!((total - 1.0).abs() < 1e-6, "joint P sums to {total}");
        for i in 0..n {
            for j in 0..n {
                assert!((p[i * n + j] - p[j * n + i]).abs() < 1e-15);
            }
        }
    }

    #[test]
    fn test_small_inputs() {
        assert!(quick().fit(&[]).is_empty());
        assert_eq!(quick().fit(&[vec![1.0, 2.0]]), vec![[0.0, 0.0]]);
        assert_eq!(quick().fit(&[vec![1.0], vec![2.0], vec![3.0]]).len(), 3);
    }

    #[test]
    fn test_fit_is_deterministic_for_a_seed() {
        let data = two_clusters();
        assert_eq!(quick().fit(&data), quick().fit(&data));
    }

    #[test]
    fn test_separated_clusters_stay_separated() {
        let data = two_clusters();
        let y = quick().fit(&data);
        assert_eq!(y.len(), 24);

        let (mut intra, mut inter) = (Vec::new(), Vec::new());
        for i in 0..24 {
            for j in (i + 1)..24 {
                let same = (i < 12) == (j < 12);
                if same { intra.push(dist(y[i], y[j])) } else { inter.push(dist(y[i], y[j])) }
            }
        }
        let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
        assert!(mean(&intra) < mean(&inter));
    }
}
