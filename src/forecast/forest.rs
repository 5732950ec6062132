//! Random-forest regressor
//!
//! Bootstrap-bagged regression trees with variance-reduction splits.
//! Fitting is deterministic for a given seed; the training sets here are
//! small (tens of rows), so exhaustive split search per feature is fine.

/// Linear congruential generator for deterministic bootstrap sampling
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407),
        }
    }

    fn next(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state >> 16
    }
}

/// A node of a regression tree
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Single regression tree with variance-reduction splits
struct RegressionTree {
    root: Node,
}

impl RegressionTree {
    const MIN_SAMPLES_SPLIT: usize = 2;

    fn fit(rows: &[Vec<f64>], targets: &[f64], indices: Vec<usize>, max_depth: usize) -> Self {
        Self {
            root: Self::build(rows, targets, indices, max_depth),
        }
    }

    fn build(rows: &[Vec<f64>], targets: &[f64], indices: Vec<usize>, depth_left: usize) -> Node {
        let node_mean = Self::mean_of(targets, &indices);

        if depth_left == 0 || indices.len() < Self::MIN_SAMPLES_SPLIT {
            return Node::Leaf { value: node_mean };
        }

        let node_sse = Self::sse_of(targets, &indices, node_mean);
        if node_sse <= f64::EPSILON {
            return Node::Leaf { value: node_mean };
        }

        let n_features = rows[indices[0]].len();
        let mut best: Option<(usize, f64, f64)> = None; // feature, threshold, sse

        for feature in 0..n_features {
            let mut values: Vec<f64> = indices.iter().map(|&i| rows[i][feature]).collect();
            values.sort_by(|a, b| a.total_cmp(b));
            values.dedup();

            for pair in values.windows(2) {
                let threshold = (pair[0] + pair[1]) / 2.0;
                let (left, right): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| rows[i][feature] <= threshold);
                if left.is_empty() || right.is_empty() {
                    continue;
                }

                let left_mean = Self::mean_of(targets, &left);
                let right_mean = Self::mean_of(targets, &right);
                let split_sse = Self::sse_of(targets, &left, left_mean)
                    + Self::sse_of(targets, &right, right_mean);

                if best.map_or(split_sse < node_sse, |(_, _, b)| split_sse < b) {
                    best = Some((feature, threshold, split_sse));
                }
            }
        }

        let Some((feature, threshold, _)) = best else {
            return Node::Leaf { value: node_mean };
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| rows[i][feature] <= threshold);

        Node::Split {
            feature,
            threshold,
            left: Box::new(Self::build(rows, targets, left_idx, depth_left - 1)),
            right: Box::new(Self::build(rows, targets, right_idx, depth_left - 1)),
        }
    }

    fn predict(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    fn mean_of(targets: &[f64], indices: &[usize]) -> f64 {
        if indices.is_empty() {
            return 0.0;
        }
        indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64
    }

    fn sse_of(targets: &[f64], indices: &[usize], mean: f64) -> f64 {
        indices.iter().map(|&i| (targets[i] - mean).powi(2)).sum()
    }
}

/// Ensemble of bagged regression trees
pub struct RandomForestRegressor {
    trees: Vec<RegressionTree>,
    n_trees: usize,
    max_depth: usize,
    sample_ratio: f64,
    seed: u64,
}

impl RandomForestRegressor {
    /// Create an unfitted forest
    pub fn new(n_trees: usize, max_depth: usize, seed: u64) -> Self {
        Self {
            trees: Vec::new(),
            n_trees,
            max_depth,
            sample_ratio: 0.8,
            seed,
        }
    }

    /// Fit the forest on a training matrix and target vector
    pub fn fit(&mut self, rows: &[Vec<f64>], targets: &[f64]) {
        self.trees.clear();
        if rows.is_empty() || rows.len() != targets.len() {
            return;
        }

        let mut rng = Lcg::new(self.seed);
        let sample_size = ((rows.len() as f64 * self.sample_ratio) as usize).max(1);

        for _ in 0..self.n_trees {
            let bootstrap: Vec<usize> = (0..sample_size)
                .map(|_| rng.next() as usize % rows.len())
                .collect();
            self.trees
                .push(RegressionTree::fit(rows, targets, bootstrap, self.max_depth));
        }
    }

    /// True once `fit` has produced trees
    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Predict a single row by averaging over all trees
    pub fn predict(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|t| t.predict(row)).sum::<f64>() / self.trees.len() as f64
    }

    /// Coefficient of determination over the given rows
    ///
    /// In-sample fit quality when called on the training data. A constant
    /// target scores 1.0 when reproduced exactly, 0.0 otherwise.
    pub fn r_squared(&self, rows: &[Vec<f64>], targets: &[f64]) -> f64 {
        if rows.is_empty() || rows.len() != targets.len() {
            return 0.0;
        }

        let target_mean = targets.iter().sum::<f64>() / targets.len() as f64;
        let mut ss_res = 0.0;
        let mut ss_tot = 0.0;
        for (row, &actual) in rows.iter().zip(targets) {
            ss_res += (actual - self.predict(row)).powi(2);
            ss_tot += (actual - target_mean).powi(2);
        }

        if ss_tot <= f64::EPSILON {
            return if ss_res <= f64::EPSILON { 1.0 } else { 0.0 };
        }
        1.0 - ss_res / ss_tot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_training() -> (Vec<Vec<f64>>, Vec<f64>) {
        // Target is a simple function of the first feature.
        let rows: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64, (i % 7) as f64]).collect();
        let targets: Vec<f64> = (0..30).map(|i| 10.0 + 2.0 * i as f64).collect();
        (rows, targets)
    }

    #[test]
    fn test_fit_and_predict_in_range() {
        let (rows, targets) = linear_training();
        let mut forest = RandomForestRegressor::new(20, 6, 42);
        forest.fit(&rows, &targets);
        assert!(forest.is_fitted());

        let prediction = forest.predict(&[15.0, 1.0]);
        // Tree averages stay within the training target range.
        assert!(prediction >= 10.0 && prediction <= 68.0);
    }

    #[test]
    fn test_deterministic_for_fixed_seed() {
        let (rows, targets) = linear_training();
        let mut a = RandomForestRegressor::new(20, 6, 42);
        let mut b = RandomForestRegressor::new(20, 6, 42);
        a.fit(&rows, &targets);
        b.fit(&rows, &targets);
        assert_eq!(a.predict(&[12.0, 5.0]), b.predict(&[12.0, 5.0]));
    }

    #[test]
    fn test_r_squared_high_on_learnable_target() {
        let (rows, targets) = linear_training();
        let mut forest = RandomForestRegressor::new(30, 8, 42);
        forest.fit(&rows, &targets);
        let r2 = forest.r_squared(&rows, &targets);
        assert!(r2 > 0.7, "training R² was {r2}");
    }

    #[test]
    fn test_constant_target_r_squared() {
        let rows: Vec<Vec<f64>> = (0..12).map(|i| vec![i as f64]).collect();
        let targets = vec![5.0; 12];
        let mut forest = RandomForestRegressor::new(10, 4, 7);
        forest.fit(&rows, &targets);
        assert_eq!(forest.r_squared(&rows, &targets), 1.0);
    }

    #[test]
    fn test_unfitted_predicts_zero() {
        let forest = RandomForestRegressor::new(10, 4, 1);
        assert_eq!(forest.predict(&[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_empty_training_is_noop() {
        let mut forest = RandomForestRegressor::new(10, 4, 1);
        forest.fit(&[], &[]);
        assert!(!forest.is_fitted());
    }
}
