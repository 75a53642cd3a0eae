//! Multi-class CART trees (Gini impurity) and a bagged random forest over them.

use crate::error::ModelError;
use crate::features::LabeledDataset;
use ndarray::ArrayView2;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random forest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples to split a node
    pub min_samples_split: usize,
    /// Minimum samples in each leaf
    pub min_samples_leaf: usize,
    /// Candidate features per split (ceil(sqrt(n_features)) if None)
    pub max_features: Option<usize>,
    /// Sample rows with replacement per tree
    pub bootstrap: bool,
    /// Base seed; tree `i` uses `seed + i`
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: 16,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl From<&crate::config::TrainingConfig> for ForestConfig {
    fn from(c: &crate::config::TrainingConfig) -> Self {
        Self {
            n_trees: c.n_trees,
            max_depth: c.max_depth,
            min_samples_split: c.min_samples_split,
            min_samples_leaf: c.min_samples_leaf,
            max_features: None,
            bootstrap: c.bootstrap,
            seed: c.seed,
        }
    }
}

#[derive(Debug, Clone)]
struct TreeConfig {
    max_depth: usize,
    min_samples_split: usize,
    min_samples_leaf: usize,
    max_features: usize,
    seed: u64,
}

/// Node in a tree's flat arena. Children always sit after their parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Leaf {
        class_probs: Vec<f64>,
        n_samples: usize,
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
    nodes: Vec<TreeNode>,
    n_classes: usize,
    feature_importances: Vec<f64>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

struct TreeBuilder<'a> {
    config: TreeConfig,
    x: ArrayView2<'a, f64>,
    y: &'a [usize],
    n_classes: usize,
    nodes: Vec<TreeNode>,
    importances: Vec<f64>,
    rng: ChaCha8Rng,
}

fn gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

impl<'a> TreeBuilder<'a> {
    fn class_counts(&self, rows: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &i in rows {
            counts[self.y[i]] += 1;
        }
        counts
    }

    fn push_leaf(&mut self, counts: &[usize], n: usize) -> usize {
        let class_probs = counts
            .iter()
            .map(|&c| if n == 0 { 0.0 } else { c as f64 / n as f64 })
            .collect();
        self.nodes.push(TreeNode::Leaf {
            class_probs,
            n_samples: n,
        });
        self.nodes.len() - 1
    }

    fn build(&mut self, rows: &[usize], depth: usize) -> usize {
        let n = rows.len();
        let counts = self.class_counts(rows);
        let impurity = gini(&counts, n);

        if depth >= self.config.max_depth
            || n < self.config.min_samples_split
            || impurity < 1e-12
        {
            return self.push_leaf(&counts, n);
        }

        let Some(split) = self.find_best_split(rows, &counts, impurity) else {
            return self.push_leaf(&counts, n);
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .copied()
            .partition(|&i| self.x[[i, split.feature]] <= split.threshold);
        if left_rows.is_empty() || right_rows.is_empty() {
            return self.push_leaf(&counts, n);
        }

        self.importances[split.feature] += split.gain * n as f64;

        // Reserve the parent slot so children get larger indices.
        let idx = self.nodes.len();
        self.nodes.push(TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: 0,
            right: 0,
        });
        let left = self.build(&left_rows, depth + 1);
        let right = self.build(&right_rows, depth + 1);
        self.nodes[idx] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        idx
    }

    /// Sweep each candidate feature in sorted order, updating class counts incrementally.
    /// Keeps drawing features past `max_features` until at least one valid split exists.
    fn find_best_split(
        &mut self,
        rows: &[usize],
        parent_counts: &[usize],
        parent_impurity: f64,
    ) -> Option<SplitCandidate> {
        let n = rows.len();
        let n_features = self.x.ncols();
        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(&mut self.rng);

        let mut best: Option<SplitCandidate> = None;
        let mut order = rows.to_vec();

        for (visited, &f) in features.iter().enumerate() {
            if visited >= self.config.max_features && best.is_some() {
                break;
            }
            order.sort_by(|&a, &b| self.x[[a, f]].total_cmp(&self.x[[b, f]]));

            let mut left = vec![0usize; self.n_classes];
            let mut right = parent_counts.to_vec();
            for pos in 0..n - 1 {
                let cls = self.y[order[pos]];
                left[cls] += 1;
                right[cls] -= 1;

                let v = self.x[[order[pos], f]];
                let next = self.x[[order[pos + 1], f]];
                if v == next {
                    continue;
                }
                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < self.config.min_samples_leaf || n_right < self.config.min_samples_leaf {
                    continue;
                }

                let weighted =
                    (n_left as f64 * gini(&left, n_left) + n_right as f64 * gini(&right, n_right))
                        / n as f64;
                let gain = parent_impurity - weighted;
                if gain > best.as_ref().map_or(0.0, |b| b.gain) {
                    best = Some(SplitCandidate {
                        feature: f,
                        threshold: v + (next - v) / 2.0,
                        gain,
                    });
                }
            }
        }
        best
    }
}

impl DecisionTree {
    fn fit<'a>(
        config: TreeConfig,
        x: ArrayView2<'a, f64>,
        y: &'a [usize],
        rows: &[usize],
        n_classes: usize,
    ) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let n_features = x.ncols();
        let mut builder = TreeBuilder {
            config,
            x,
            y,
            n_classes,
            nodes: Vec::new(),
            importances: vec![0.0; n_features],
            rng,
        };
        builder.build(rows, 0);

        let mut feature_importances = builder.importances;
        let sum: f64 = feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut feature_importances {
                *imp /= sum;
            }
        }

        Self {
            nodes: builder.nodes,
            n_classes,
            feature_importances,
        }
    }

    /// Leaf class distribution for one sample.
    pub fn predict_proba_one(&self, x: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { class_probs, .. } => return class_probs,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], idx: usize) -> usize {
            match &nodes[idx] {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Structural checks so traversal of a deserialized tree cannot index out of bounds or loop.
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { class_probs, .. } => {
                    if class_probs.len() != self.n_classes {
                        return Err(format!("node {i}: leaf has {} classes", class_probs.len()));
                    }
                }
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= n_features {
                        return Err(format!("node {i}: feature index {feature} out of range"));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!("node {i}: bad child index {child}"));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Bagged ensemble of decision trees; predicts by averaging leaf distributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    n_features: usize,
    n_classes: usize,
    trees: Vec<DecisionTree>,
    feature_importances: Vec<f64>,
    oob_accuracy: Option<f64>,
}

impl RandomForest {
    /// Fit a forest on a labeled dataset. Trees are built in parallel; each tree's
    /// bootstrap and feature draws depend only on `seed + tree_index`.
    pub fn fit(config: &ForestConfig, data: &LabeledDataset) -> Result<Self, ModelError> {
        if data.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if config.n_trees == 0 {
            return Err(ModelError::InvalidConfig("n_trees must be at least 1".into()));
        }
        if config.max_depth == 0 {
            return Err(ModelError::InvalidConfig("max_depth must be at least 1".into()));
        }

        let n_samples = data.n_samples();
        let n_features = data.features.ncols();
        let n_classes = crate::risk::RiskLabel::COUNT;
        let y: Vec<usize> = data.labels.iter().map(|l| l.class_id()).collect();
        let max_features = config
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().ceil() as usize)
            .clamp(1, n_features);
        let x = data.features.view();

        let fitted: Vec<(DecisionTree, Vec<usize>)> = (0..config.n_trees)
            .into_par_iter()
            .map(|t| {
                let seed = config.seed.wrapping_add(t as u64);
                let rows = if config.bootstrap {
                    data.bootstrap_indices(seed)
                } else {
                    (0..n_samples).collect()
                };
                let tree_config = TreeConfig {
                    max_depth: config.max_depth,
                    min_samples_split: config.min_samples_split.max(2),
                    min_samples_leaf: config.min_samples_leaf.max(1),
                    max_features,
                    seed,
                };
                let tree = DecisionTree::fit(tree_config, x, &y, &rows, n_classes);
                (tree, rows)
            })
            .collect();

        let oob_accuracy = if config.bootstrap {
            Self::compute_oob_accuracy(&fitted, data, &y, n_classes)
        } else {
            None
        };

        let trees: Vec<DecisionTree> = fitted.into_iter().map(|(t, _)| t).collect();

        let mut feature_importances = vec![0.0; n_features];
        for tree in &trees {
            for (i, imp) in tree.feature_importances().iter().enumerate() {
                feature_importances[i] += imp;
            }
        }
        let sum: f64 = feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut feature_importances {
                *imp /= sum;
            }
        }

        Ok(Self {
            config: config.clone(),
            n_features,
            n_classes,
            trees,
            feature_importances,
            oob_accuracy,
        })
    }

    /// Accuracy on rows each tree did not see, voting only with those trees.
    fn compute_oob_accuracy(
        fitted: &[(DecisionTree, Vec<usize>)],
        data: &LabeledDataset,
        y: &[usize],
        n_classes: usize,
    ) -> Option<f64> {
        let n = data.n_samples();
        let mut sums = vec![vec![0.0; n_classes]; n];
        let mut voted = vec![false; n];

        for (tree, rows) in fitted {
            let mut in_bag = vec![false; n];
            for &r in rows {
                in_bag[r] = true;
            }
            for i in (0..n).filter(|&i| !in_bag[i]) {
                let x: Vec<f64> = data.features.row(i).to_vec();
                for (s, p) in sums[i].iter_mut().zip(tree.predict_proba_one(&x)) {
                    *s += p;
                }
                voted[i] = true;
            }
        }

        let (mut correct, mut total) = (0usize, 0usize);
        for i in (0..n).filter(|&i| voted[i]) {
            total += 1;
            if argmax(&sums[i]) == y[i] {
                correct += 1;
            }
        }
        (total > 0).then(|| correct as f64 / total as f64)
    }

    /// Mean of per-tree class distributions.
    pub fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        let mut probs = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in probs.iter_mut().zip(tree.predict_proba_one(x)) {
                *acc += p;
            }
        }
        let n = self.trees.len().max(1) as f64;
        probs.iter_mut().for_each(|p| *p /= n);
        probs
    }

    /// Class id with the highest mean probability; ties go to the lower id.
    pub fn predict_class(&self, x: &[f64]) -> usize {
        argmax(&self.predict_proba(x))
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    pub fn oob_accuracy(&self) -> Option<f64> {
        self.oob_accuracy
    }

    /// Validate a deserialized forest against the expected input and output widths.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::Malformed("forest has no trees".into()));
        }
        if self.n_features != n_features || self.n_classes != n_classes {
            return Err(ModelError::Malformed(format!(
                "forest is {}x{}, expected {}x{}",
                self.n_features, self.n_classes, n_features, n_classes
            )));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            if tree.n_classes != n_classes {
                return Err(ModelError::Malformed(format!("tree {i}: wrong class count")));
            }
            tree.validate(n_features)
                .map_err(|e| ModelError::Malformed(format!("tree {i}: {e}")))?;
        }
        Ok(())
    }
}

fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{label_records, UsageRecord};

    fn grid_records() -> Vec<UsageRecord> {
        let mut out = Vec::new();
        for social in (0..=240).step_by(20) {
            for night in (0..=180).step_by(30) {
                for red in 0..4 {
                    out.push(UsageRecord {
                        instagram: social,
                        youtube: 0,
                        whatsapp: 0,
                        study: 60,
                        night_usage: night,
                        red_days: red,
                    });
                }
            }
        }
        out
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[10, 0, 0], 10), 0.0);
        assert!((gini(&[5, 5, 0], 10) - 0.5).abs() < 1e-12);
        assert_eq!(gini(&[0, 0, 0], 0), 0.0);
    }

    #[test]
    fn test_argmax_prefers_lower_index_on_tie() {
        assert_eq!(argmax(&[0.4, 0.4, 0.2]), 0);
        assert_eq!(argmax(&[0.1, 0.3, 0.6]), 2);
    }

    #[test]
    fn test_single_tree_fits_training_data() {
        let data = label_records(&grid_records());
        let y: Vec<usize> = data.labels.iter().map(|l| l.class_id()).collect();
        let rows: Vec<usize> = (0..data.n_samples()).collect();
        let config = TreeConfig {
            max_depth: 32,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: 4,
            seed: 7,
        };
        let tree = DecisionTree::fit(config, data.features.view(), &y, &rows, 3);
        assert!(tree.validate(4).is_ok());

        let correct = rows
            .iter()
            .filter(|&&i| {
                let x = data.features.row(i).to_vec();
                argmax(tree.predict_proba_one(&x)) == y[i]
            })
            .count();
        assert_eq!(correct, rows.len());
    }

    #[test]
    fn test_random_forest_classification() {
        let data = label_records(&grid_records());
        let forest = RandomForest::fit(
            &ForestConfig {
                n_trees: 20,
                max_depth: 10,
                ..Default::default()
            },
            &data,
        )
        .unwrap();

        assert_eq!(forest.n_trees(), 20);
        assert_eq!(forest.feature_importances().len(), 4);
        assert!(forest.oob_accuracy().is_some());

        let correct = (0..data.n_samples())
            .filter(|&i| {
                let x = data.features.row(i).to_vec();
                forest.predict_class(&x) == data.labels[i].class_id()
            })
            .count();
        assert!(correct as f64 / data.n_samples() as f64 > 0.9);
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let data = label_records(&[]);
        assert!(matches!(
            RandomForest::fit(&ForestConfig::default(), &data),
            Err(ModelError::EmptyTrainingSet)
        ));
    }

    #[test]
    fn test_validate_rejects_backward_child() {
        let tree = DecisionTree {
            nodes: vec![TreeNode::Split {
                feature: 0,
                threshold: 1.0,
                left: 0,
                right: 0,
            }],
            n_classes: 3,
            feature_importances: vec![0.0; 4],
        };
        assert!(tree.validate(4).is_err());
    }
}
