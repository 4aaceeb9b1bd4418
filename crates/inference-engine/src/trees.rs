//! Boosted Tree Ensemble
//!
//! Binary-logistic gradient boosted trees with XGBoost split semantics:
//! a row goes left when `x < threshold`, NaN follows the node's default
//! branch, and the summed leaf margin is mapped through the logistic function.

use crate::classifier::{sigmoid, Classifier};
use crate::InferenceError;
use serde::{Deserialize, Serialize};

/// A node of one tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        /// Branch taken for missing values
        #[serde(default = "default_left")]
        default_left: bool,
    },
    Leaf {
        leaf: f64,
    },
}

fn default_left() -> bool {
    true
}

/// One tree; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

/// Serialized ensemble as stored in a model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsembleSpec {
    pub n_features: usize,
    /// Initial margin added before the trees (logit of the base score)
    #[serde(default)]
    pub base_margin: f64,
    pub trees: Vec<Tree>,
}

/// Validated tree ensemble
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    n_features: usize,
    base_margin: f64,
    trees: Vec<Tree>,
}

impl TreeEnsemble {
    /// Validate structure: every child index points forward and in range,
    /// every split feature is below `n_features`. Forward-only children
    /// guarantee traversal terminates.
    pub fn new(spec: TreeEnsembleSpec) -> Result<Self, InferenceError> {
        if spec.trees.is_empty() {
            return Err(InferenceError::InvalidModel("ensemble has no trees".into()));
        }

        for (t, tree) in spec.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(InferenceError::InvalidModel(format!("tree {} is empty", t)));
            }
            for (n, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                        ..
                    } => {
                        if *feature >= spec.n_features {
                            return Err(InferenceError::InvalidModel(format!(
                                "tree {} node {} splits on feature {} of {}",
                                t, n, feature, spec.n_features
                            )));
                        }
                        if threshold.is_nan() {
                            return Err(InferenceError::InvalidModel(format!(
                                "tree {} node {} has NaN threshold",
                                t, n
                            )));
                        }
                        for child in [*left, *right] {
                            if child <= n || child >= tree.nodes.len() {
                                return Err(InferenceError::InvalidModel(format!(
                                    "tree {} node {} has invalid child {}",
                                    t, n, child
                                )));
                            }
                        }
                    }
                    TreeNode::Leaf { leaf } => {
                        if !leaf.is_finite() {
                            return Err(InferenceError::InvalidModel(format!(
                                "tree {} node {} has non-finite leaf",
                                t, n
                            )));
                        }
                    }
                }
            }
        }

        Ok(Self {
            n_features: spec.n_features,
            base_margin: spec.base_margin,
            trees: spec.trees,
        })
    }

    /// Number of trees
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Raw margin before the logistic link
    pub fn margin(&self, row: &[f64]) -> Result<f64, InferenceError> {
        self.check_width(row)?;
        Ok(self.base_margin + self.trees.iter().map(|tree| leaf_value(tree, row)).sum::<f64>())
    }
}

fn leaf_value(tree: &Tree, row: &[f64]) -> f64 {
    let mut idx = 0;
    loop {
        match &tree.nodes[idx] {
            TreeNode::Leaf { leaf } => return *leaf,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
                default_left,
            } => {
                let value = row[*feature];
                idx = if value.is_nan() {
                    if *default_left {
                        *left
                    } else {
                        *right
                    }
                } else if value < *threshold {
                    *left
                } else {
                    *right
                };
            }
        }
    }
}

impl Classifier for TreeEnsemble {
    fn kind(&self) -> &'static str {
        "tree_ensemble"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    /// NaN follows each split's default direction
    fn handles_missing(&self) -> bool {
        true
    }

    fn predict_proba_row(&self, row: &[f64]) -> Result<[f64; 2], InferenceError> {
        let p_leave = sigmoid(self.margin(row)?);
        Ok([1.0 - p_leave, p_leave])
    }
}
