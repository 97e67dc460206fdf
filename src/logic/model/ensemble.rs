//! Tree Ensemble - Gradient-boosted trees in XGBoost JSON format
//!
//! Trees are stored as flat node arrays. Node 0 is the root; a node is a
//! leaf when it has no children. Splits follow XGBoost: go left when
//! `x < threshold` (compared in f32), a missing value follows `default_left`.
//! Models saved after early stopping keep only the trees up to
//! `best_iteration`, which is what XGBoost itself predicts with.

use std::collections::HashMap;
use serde::Deserialize;

/// Child index used for "no child"
const NO_CHILD: i32 = -1;

// ============================================================================
// OBJECTIVE
// ============================================================================

/// Supported learning objectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, Deserialize)]
pub enum Objective {
    /// `binary:logistic` - probability output, base score in probability space
    BinaryLogistic,
    /// `reg:logistic` - same link as binary:logistic
    RegLogistic,
    /// `binary:logitraw` - margin output, base score in margin space
    BinaryLogitRaw,
}

impl Objective {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "binary:logistic" => Some(Self::BinaryLogistic),
            "reg:logistic" => Some(Self::RegLogistic),
            "binary:logitraw" => Some(Self::BinaryLogitRaw),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::BinaryLogistic => "binary:logistic",
            Self::RegLogistic => "reg:logistic",
            Self::BinaryLogitRaw => "binary:logitraw",
        }
    }

    /// Convert the stored base score to margin space
    pub fn base_margin(&self, base_score: f64) -> f64 {
        match self {
            Self::BinaryLogistic | Self::RegLogistic => logit(base_score),
            Self::BinaryLogitRaw => base_score,
        }
    }
}

pub fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}

pub fn logit(p: f64) -> f64 {
    let p = p.clamp(1e-16, 1.0 - 1e-16);
    (p / (1.0 - p)).ln()
}

// ============================================================================
// TREE
// ============================================================================

/// One node of a regression tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub left: Option<usize>,
    pub right: Option<usize>,
    pub feature: usize,
    pub threshold: f32,
    pub default_left: bool,
    /// Leaf output (ignored for split nodes)
    pub value: f64,
    /// Sum of hessian reaching the node
    pub cover: f64,
    /// Loss reduction of the split (0 for leaves)
    pub gain: f64,
}

impl Node {
    pub fn leaf(value: f64, cover: f64) -> Self {
        Self {
            left: None,
            right: None,
            feature: 0,
            threshold: 0.0,
            default_left: false,
            value,
            cover,
            gain: 0.0,
        }
    }

    pub fn split(feature: usize, threshold: f32, left: usize, right: usize, cover: f64, gain: f64) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
            feature,
            threshold,
            default_left: true,
            value: 0.0,
            cover,
            gain,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none()
    }

    /// Child taken by feature value `x`
    pub fn next(&self, x: f64) -> Option<usize> {
        if x.is_nan() {
            if self.default_left { self.left } else { self.right }
        } else if (x as f32) < self.threshold {
            self.left
        } else {
            self.right
        }
    }
}

/// Regression tree
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Build and validate a tree
    ///
    /// Children must point forward (index greater than the parent), which
    /// rules out cycles.
    pub fn new(nodes: Vec<Node>, num_features: usize) -> Result<Self, String> {
        if nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (i, node) in nodes.iter().enumerate() {
            match (node.left, node.right) {
                (None, None) => {}
                (Some(l), Some(r)) => {
                    if l <= i || r <= i || l >= nodes.len() || r >= nodes.len() {
                        return Err(format!("node {} has invalid children ({}, {})", i, l, r));
                    }
                    if node.feature >= num_features {
                        return Err(format!(
                            "node {} splits on feature {} but model has {} features",
                            i, node.feature, num_features
                        ));
                    }
                }
                _ => return Err(format!("node {} has exactly one child", i)),
            }
        }

        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    /// Index of the leaf reached by `x`
    pub fn leaf_index(&self, x: &[f64]) -> usize {
        let mut index = 0;
        loop {
            let node = &self.nodes[index];
            if node.is_leaf() {
                return index;
            }
            match node.next(x[node.feature]) {
                Some(child) => index = child,
                None => return index,
            }
        }
    }

    /// Raw output of this tree for `x`
    pub fn predict(&self, x: &[f64]) -> f64 {
        self.nodes[self.leaf_index(x)].value
    }

    /// Cover-weighted mean output over the training distribution
    pub fn expected_value(&self) -> f64 {
        self.node_expectation(0)
    }

    fn node_expectation(&self, index: usize) -> f64 {
        let node = &self.nodes[index];
        match (node.left, node.right) {
            (Some(l), Some(r)) => {
                let (cl, cr) = (self.nodes[l].cover, self.nodes[r].cover);
                let total = cl + cr;
                if total <= 0.0 {
                    return 0.5 * (self.node_expectation(l) + self.node_expectation(r));
                }
                (cl * self.node_expectation(l) + cr * self.node_expectation(r)) / total
            }
            _ => node.value,
        }
    }

    pub fn depth(&self) -> usize {
        self.node_depth(0)
    }

    fn node_depth(&self, index: usize) -> usize {
        let node = &self.nodes[index];
        match (node.left, node.right) {
            (Some(l), Some(r)) => 1 + self.node_depth(l).max(self.node_depth(r)),
            _ => 0,
        }
    }
}

// ============================================================================
// ENSEMBLE
// ============================================================================

/// Additive tree ensemble for binary classification
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEnsemble {
    trees: Vec<Tree>,
    base_margin: f64,
    base_score: f64,
    num_features: usize,
    feature_names: Vec<String>,
    objective: Objective,
}

impl TreeEnsemble {
    /// Build an ensemble directly (tests, stub models)
    pub fn new(
        trees: Vec<Tree>,
        base_score: f64,
        objective: Objective,
        num_features: usize,
        feature_names: Vec<String>,
    ) -> Self {
        Self {
            trees,
            base_margin: objective.base_margin(base_score),
            base_score,
            num_features,
            feature_names,
            objective,
        }
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Trained column names; empty if the artifact did not record them
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn base_margin(&self) -> f64 {
        self.base_margin
    }

    /// Raw (pre-sigmoid) output
    pub fn margin(&self, x: &[f64]) -> f64 {
        self.base_margin + self.trees.iter().map(|t| t.predict(x)).sum::<f64>()
    }

    /// Probability of the positive class
    pub fn probability(&self, x: &[f64]) -> f64 {
        sigmoid(self.margin(x))
    }

    /// Margin expected with no evidence about the row
    pub fn expected_margin(&self) -> f64 {
        self.base_margin + self.trees.iter().map(Tree::expected_value).sum::<f64>()
    }

    /// Parse an XGBoost JSON model document
    pub fn from_xgboost_json(bytes: &[u8]) -> Result<Self, String> {
        let doc: XgbDocument = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
        let learner = doc.learner;

        let objective = Objective::parse(&learner.objective.name)
            .ok_or_else(|| format!("unsupported objective `{}`", learner.objective.name))?;

        let params = &learner.learner_model_param;
        let num_class: usize = parse_number(&params.num_class, "num_class")?;
        if num_class > 1 {
            return Err(format!("multi-class models are not supported (num_class = {})", num_class));
        }
        let num_features: usize = parse_number(&params.num_feature, "num_feature")?;
        let base_score = parse_base_score(&params.base_score)?;

        if learner.gradient_booster.name != "gbtree" {
            return Err(format!("unsupported booster `{}`", learner.gradient_booster.name));
        }
        let model = learner
            .gradient_booster
            .model
            .ok_or_else(|| "gbtree booster has no model".to_string())?;

        if !learner.feature_names.is_empty() && learner.feature_names.len() != num_features {
            return Err(format!(
                "{} feature names for {} features",
                learner.feature_names.len(),
                num_features
            ));
        }

        let mut xgb_trees = model.trees;
        if let Some(best) = learner.attributes.get("best_iteration") {
            let best: usize = parse_number(best, "best_iteration")?;
            let per_round = match &model.gbtree_model_param {
                Some(param) => parse_number::<usize>(&param.num_parallel_tree, "num_parallel_tree")?.max(1),
                None => 1,
            };
            let keep = (best + 1).saturating_mul(per_round);
            if keep < xgb_trees.len() {
                log::info!(
                    "Early-stopped model: using {} of {} trees (best_iteration {})",
                    keep,
                    xgb_trees.len(),
                    best
                );
                xgb_trees.truncate(keep);
            }
        }

        let trees = xgb_trees
            .into_iter()
            .enumerate()
            .map(|(i, t)| t.into_tree(num_features).map_err(|e| format!("tree {}: {}", i, e)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(trees, base_score, objective, num_features, learner.feature_names))
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("invalid {} `{}`", what, raw))
}

/// `"5E-1"` or, from XGBoost 3, `"[5E-1]"`
fn parse_base_score(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    let value: f64 = parse_number(trimmed, "base_score")?;
    if !value.is_finite() {
        return Err(format!("base_score is not finite: {}", raw));
    }
    Ok(value)
}

// ============================================================================
// XGBOOST JSON SCHEMA
// ============================================================================

#[derive(Deserialize)]
struct XgbDocument {
    learner: XgbLearner,
}

#[derive(Deserialize)]
struct XgbLearner {
    #[serde(default)]
    feature_names: Vec<String>,
    #[serde(default)]
    attributes: HashMap<String, String>,
    gradient_booster: XgbBooster,
    learner_model_param: XgbModelParam,
    objective: XgbObjective,
}

#[derive(Deserialize)]
struct XgbBooster {
    name: String,
    model: Option<XgbGbtreeModel>,
}

#[derive(Deserialize)]
struct XgbGbtreeModel {
    #[serde(default)]
    gbtree_model_param: Option<XgbGbtreeParam>,
    trees: Vec<XgbTree>,
}

#[derive(Deserialize)]
struct XgbGbtreeParam {
    #[serde(default = "default_parallel_tree")]
    num_parallel_tree: String,
}

fn default_parallel_tree() -> String {
    "1".to_string()
}

#[derive(Deserialize)]
struct XgbModelParam {
    base_score: String,
    #[serde(default = "default_num_class")]
    num_class: String,
    num_feature: String,
}

fn default_num_class() -> String {
    "0".to_string()
}

#[derive(Deserialize)]
struct XgbObjective {
    name: String,
}

/// `default_left` is written as booleans by some versions and 0/1 by others
#[derive(Deserialize, Clone, Copy)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(u8),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        }
    }
}

#[derive(Deserialize)]
struct XgbTree {
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f32>,
    default_left: Vec<Flag>,
    sum_hessian: Vec<f32>,
    #[serde(default)]
    loss_changes: Vec<f32>,
}

impl XgbTree {
    fn into_tree(self, num_features: usize) -> Result<Tree, String> {
        let n = self.left_children.len();
        let lengths = [
            self.right_children.len(),
            self.split_indices.len(),
            self.split_conditions.len(),
            self.default_left.len(),
            self.sum_hessian.len(),
        ];
        if lengths.iter().any(|&len| len != n) {
            return Err("node arrays have different lengths".to_string());
        }
        if !self.loss_changes.is_empty() && self.loss_changes.len() != n {
            return Err("loss_changes length does not match node count".to_string());
        }

        let child = |c: i32| -> Result<Option<usize>, String> {
            match c {
                NO_CHILD => Ok(None),
                c if c >= 0 => Ok(Some(c as usize)),
                c => Err(format!("invalid child index {}", c)),
            }
        };

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let feature = usize::try_from(self.split_indices[i])
                .map_err(|_| format!("node {} has negative split index", i))?;
            nodes.push(Node {
                left: child(self.left_children[i])?,
                right: child(self.right_children[i])?,
                feature,
                threshold: self.split_conditions[i],
                default_left: self.default_left[i].is_set(),
                // Leaves keep their output in split_conditions
                value: self.split_conditions[i] as f64,
                cover: self.sum_hessian[i] as f64,
                gain: self.loss_changes.get(i).copied().unwrap_or(0.0) as f64,
            });
        }

        // Leaves report feature 0 in XGBoost output; only splits are range-checked
        for node in nodes.iter_mut().filter(|n| n.is_leaf()) {
            node.feature = 0;
        }

        Tree::new(nodes, num_features)
    }
}
