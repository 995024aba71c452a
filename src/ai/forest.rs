use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TREES: usize = 100;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, Copy)]
pub struct ForestParams {
    pub n_trees: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_TREES,
            seed: DEFAULT_SEED,
        }
    }
}

// ---------------------------------------------------------------------------
// Split objectives
// ---------------------------------------------------------------------------

trait Objective {
    type Acc: Clone;

    fn empty(&self) -> Self::Acc;
    fn push(&self, acc: &mut Self::Acc, sample: usize);
    fn pop(&self, acc: &mut Self::Acc, sample: usize);
    /// Node impurity multiplied by its sample count.
    fn weighted_impurity(&self, acc: &Self::Acc) -> f64;
    fn leaf_value(&self, acc: &Self::Acc) -> Vec<f64>;
}

struct Gini<'a> {
    y: &'a [usize],
    n_classes: usize,
}

#[derive(Clone)]
struct ClassCounts {
    counts: Vec<f64>,
    n: f64,
}

impl Objective for Gini<'_> {
    type Acc = ClassCounts;

    fn empty(&self) -> ClassCounts {
        ClassCounts {
            counts: vec![0.0; self.n_classes],
            n: 0.0,
        }
    }

    fn push(&self, acc: &mut ClassCounts, sample: usize) {
        acc.counts[self.y[sample]] += 1.0;
        acc.n += 1.0;
    }

    fn pop(&self, acc: &mut ClassCounts, sample: usize) {
        acc.counts[self.y[sample]] -= 1.0;
        acc.n -= 1.0;
    }

    fn weighted_impurity(&self, acc: &ClassCounts) -> f64 {
        if acc.n == 0.0 {
            return 0.0;
        }
        acc.n - acc.counts.iter().map(|c| c * c).sum::<f64>() / acc.n
    }

    fn leaf_value(&self, acc: &ClassCounts) -> Vec<f64> {
        acc.counts.iter().map(|c| c / acc.n).collect()
    }
}

struct SquaredError<'a> {
    y: &'a [f64],
}

#[derive(Clone)]
struct Moments {
    n: f64,
    sum: f64,
    sum_sq: f64,
}

impl Objective for SquaredError<'_> {
    type Acc = Moments;

    fn empty(&self) -> Moments {
        Moments {
            n: 0.0,
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    fn push(&self, acc: &mut Moments, sample: usize) {
        let v = self.y[sample];
        acc.n += 1.0;
        acc.sum += v;
        acc.sum_sq += v * v;
    }

    fn pop(&self, acc: &mut Moments, sample: usize) {
        let v = self.y[sample];
        acc.n -= 1.0;
        acc.sum -= v;
        acc.sum_sq -= v * v;
    }

    fn weighted_impurity(&self, acc: &Moments) -> f64 {
        if acc.n == 0.0 {
            return 0.0;
        }
        (acc.sum_sq - acc.sum * acc.sum / acc.n).max(0.0)
    }

    fn leaf_value(&self, acc: &Moments) -> Vec<f64> {
        vec![acc.sum / acc.n]
    }
}

// ---------------------------------------------------------------------------
// Decision tree
// ---------------------------------------------------------------------------

/// Flat node arena: children are indices, which keeps serialized trees shallow.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct SplitChoice {
    feature: usize,
    threshold: f64,
    score: f64,
}

fn best_split<O: Objective>(
    x: &[Vec<f64>],
    samples: &mut [usize],
    objective: &O,
    parent: &O::Acc,
    max_features: usize,
    rng: &mut StdRng,
) -> Option<SplitChoice> {
    let n_features = x.first().map_or(0, Vec::len);
    let mut features: Vec<usize> = (0..n_features).collect();
    features.shuffle(rng);

    let mut best: Option<SplitChoice> = None;
    let mut visited = 0usize;
    for feature in features {
        if visited >= max_features {
            break;
        }
        let (lo, hi) = samples
            .iter()
            .map(|&s| x[s][feature])
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        // Constant features do not count against the budget.
        if lo == hi {
            continue;
        }
        visited += 1;
        samples.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

        let mut left = objective.empty();
        let mut right = parent.clone();
        for i in 0..samples.len() - 1 {
            objective.push(&mut left, samples[i]);
            objective.pop(&mut right, samples[i]);
            let here = x[samples[i]][feature];
            let next = x[samples[i + 1]][feature];
            if here == next {
                continue;
            }
            let score = objective.weighted_impurity(&left) + objective.weighted_impurity(&right);
            if best.as_ref().map_or(true, |b| score < b.score) {
                let mut threshold = here + (next - here) / 2.0;
                if threshold >= next {
                    threshold = here;
                }
                best = Some(SplitChoice {
                    feature,
                    threshold,
                    score,
                });
            }
        }
    }
    best
}

impl DecisionTree {
    fn grow<O: Objective>(
        x: &[Vec<f64>],
        samples: Vec<usize>,
        objective: &O,
        max_features: usize,
        rng: &mut StdRng,
    ) -> Self {
        let mut nodes: Vec<Node> = vec![Node::Leaf { value: Vec::new() }];
        let mut stack: Vec<(usize, Vec<usize>)> = vec![(0, samples)];

        while let Some((slot, mut idx)) = stack.pop() {
            let mut acc = objective.empty();
            for &s in &idx {
                objective.push(&mut acc, s);
            }

            let pure = objective.weighted_impurity(&acc) <= 1e-12;
            let split = if idx.len() < 2 || pure {
                None
            } else {
                best_split(x, &mut idx, objective, &acc, max_features, rng)
            };

            match split {
                None => {
                    nodes[slot] = Node::Leaf {
                        value: objective.leaf_value(&acc),
                    };
                }
                Some(choice) => {
                    let (left, right): (Vec<usize>, Vec<usize>) = idx
                        .into_iter()
                        .partition(|&s| x[s][choice.feature] <= choice.threshold);
                    let left_slot = nodes.len();
                    nodes.push(Node::Leaf { value: Vec::new() });
                    let right_slot = nodes.len();
                    nodes.push(Node::Leaf { value: Vec::new() });
                    nodes[slot] = Node::Split {
                        feature: choice.feature,
                        threshold: choice.threshold,
                        left: left_slot,
                        right: right_slot,
                    };
                    stack.push((right_slot, right));
                    stack.push((left_slot, left));
                }
            }
        }

        Self { nodes }
    }

    fn leaf_for(&self, row: &[f64]) -> &[f64] {
        let mut at = 0;
        loop {
            match &self.nodes[at] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    at = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        fn walk(nodes: &[Node], at: usize) -> usize {
            match &nodes[at] {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

fn bootstrap(n: usize, rng: &mut StdRng) -> Vec<usize> {
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

// ---------------------------------------------------------------------------
// Forests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    classes: Vec<String>,
    trees: Vec<DecisionTree>,
}

impl RandomForestClassifier {
    /// Fits one tree per bootstrap sample, trying `sqrt(n_features)` features per split.
    pub fn fit(x: &[Vec<f64>], labels: &[String], params: ForestParams) -> Self {
        let classes: Vec<String> = labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let y: Vec<usize> = labels
            .iter()
            .map(|l| classes.binary_search(l).unwrap_or(0))
            .collect();

        if x.is_empty() {
            return Self {
                classes,
                trees: Vec::new(),
            };
        }

        let n_features = x[0].len();
        let max_features = ((n_features as f64).sqrt() as usize).max(1);
        let objective = Gini {
            y: &y,
            n_classes: classes.len(),
        };
        let mut rng = StdRng::seed_from_u64(params.seed);
        let trees = (0..params.n_trees)
            .map(|_| {
                let sample = bootstrap(x.len(), &mut rng);
                DecisionTree::grow(x, sample, &objective, max_features, &mut rng)
            })
            .collect();

        Self { classes, trees }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        let mut proba = vec![0.0; self.classes.len()];
        if self.trees.is_empty() {
            return proba;
        }
        for tree in &self.trees {
            for (p, v) in proba.iter_mut().zip(tree.leaf_for(row)) {
                *p += v;
            }
        }
        let n = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        proba
    }

    /// Most probable class; ties go to the alphabetically first label.
    pub fn predict(&self, row: &[f64]) -> Option<&str> {
        let proba = self.predict_proba(row);
        let mut best: Option<(usize, f64)> = None;
        for (i, p) in proba.into_iter().enumerate() {
            if best.map_or(true, |(_, bp)| p > bp) {
                best = Some((i, p));
            }
        }
        best.map(|(i, _)| self.classes[i].as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees: Vec<DecisionTree>,
}

impl RandomForestRegressor {
    /// Fits one tree per bootstrap sample, considering every feature at each split.
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: ForestParams) -> Self {
        if x.is_empty() {
            return Self { trees: Vec::new() };
        }
        let max_features = x[0].len().max(1);
        let objective = SquaredError { y };
        let mut rng = StdRng::seed_from_u64(params.seed);
        let trees = (0..params.n_trees)
            .map(|_| {
                let sample = bootstrap(x.len(), &mut rng);
                DecisionTree::grow(x, sample, &objective, max_features, &mut rng)
            })
            .collect();
        Self { trees }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: f64 = self.trees.iter().map(|t| t.leaf_for(row)[0]).sum();
        total / self.trees.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classifier_separates_clusters() {
        let x = vec![
            vec![0.0, 1.0],
            vec![0.1, 0.9],
            vec![0.2, 1.0],
            vec![1.0, 0.0],
            vec![0.9, 0.1],
            vec![1.0, 0.2],
        ];
        let y = labels(&["a", "a", "a", "b", "b", "b"]);
        let forest = RandomForestClassifier::fit(&x, &y, ForestParams::default());
        assert_eq!(forest.classes(), &["a".to_string(), "b".to_string()]);
        assert_eq!(forest.predict(&[0.05, 0.95]), Some("a"));
        assert_eq!(forest.predict(&[0.95, 0.05]), Some("b"));
    }

    #[test]
    fn test_classifier_probabilities_sum_to_one() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
        let y = labels(&["x", "y", "x", "y"]);
        let forest = RandomForestClassifier::fit(&x, &y, ForestParams::default());
        let total: f64 = forest.predict_proba(&[1.5]).iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_class_always_predicted() {
        let x = vec![vec![0.0], vec![5.0]];
        let y = labels(&["only", "only"]);
        let forest = RandomForestClassifier::fit(&x, &y, ForestParams::default());
        assert_eq!(forest.predict(&[100.0]), Some("only"));
    }

    #[test]
    fn test_constant_features_yield_leaf() {
        let x = vec![vec![1.0]; 4];
        let y = labels(&["a", "b", "a", "b"]);
        let forest = RandomForestClassifier::fit(&x, &y, ForestParams { n_trees: 3, seed: 1 });
        assert!(forest.trees.iter().all(|t| t.depth() == 1));
    }

    #[test]
    fn test_split_skips_constant_columns_in_sparse_rows() {
        // Wide rows like TF-IDF vectors: one informative column among many zeros.
        let informative = 137;
        let x: Vec<Vec<f64>> = (0..8)
            .map(|i| {
                let mut row = vec![0.0; 300];
                row[informative] = if i < 4 { 0.2 } else { 0.9 };
                row
            })
            .collect();
        let y: Vec<usize> = (0..8).map(|i| usize::from(i >= 4)).collect();
        let gini = Gini { y: &y, n_classes: 2 };
        let mut parent = gini.empty();
        let mut samples: Vec<usize> = (0..8).rev().collect();
        for &s in &samples {
            gini.push(&mut parent, s);
        }

        let mut rng = StdRng::seed_from_u64(DEFAULT_SEED);
        let choice = best_split(&x, &mut samples, &gini, &parent, 1, &mut rng).unwrap();
        assert_eq!(choice.feature, informative);
        assert!(choice.threshold > 0.2 && choice.threshold < 0.9);
        assert_eq!(choice.score, 0.0);

        let names: Vec<String> = y.iter().map(|&c| if c == 0 { "low" } else { "high" }.to_string()).collect();
        let forest = RandomForestClassifier::fit(&x, &names, ForestParams { n_trees: 5, seed: 3 });
        assert!(forest.trees.iter().all(|t| t.depth() <= 2));
        let mut row = vec![0.0; 300];
        row[informative] = 0.85;
        assert_eq!(forest.predict(&row), Some("high"));
    }

    #[test]
    fn test_same_seed_same_forest() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let y: Vec<String> = (0..20).map(|i| if i % 2 == 0 { "even" } else { "odd" }.to_string()).collect();
        let a = RandomForestClassifier::fit(&x, &y, ForestParams::default());
        let b = RandomForestClassifier::fit(&x, &y, ForestParams::default());
        for row in &x {
            assert_eq!(a.predict_proba(row), b.predict_proba(row));
        }
    }

    #[test]
    fn test_regressor_tracks_step_function() {
        let x: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..40).map(|i| if i < 20 { 10.0 } else { 100.0 }).collect();
        let forest = RandomForestRegressor::fit(&x, &y, ForestParams::default());
        assert!((forest.predict(&[5.0]) - 10.0).abs() < 5.0);
        assert!((forest.predict(&[35.0]) - 100.0).abs() < 5.0);
    }

    #[test]
    fn test_regressor_stays_within_target_range() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| i as f64 * 2.0).collect();
        let forest = RandomForestRegressor::fit(&x, &y, ForestParams::default());
        let p = forest.predict(&[1000.0]);
        assert!((0.0..=18.0).contains(&p));
    }

    #[test]
    fn test_empty_fit_predicts_nothing() {
        let forest = RandomForestClassifier::fit(&[], &[], ForestParams::default());
        assert_eq!(forest.predict(&[]), None);
        let reg = RandomForestRegressor::fit(&[], &[], ForestParams::default());
        assert_eq!(reg.predict(&[1.0]), 0.0);
    }
}
