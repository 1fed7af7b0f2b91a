//! CART-style regression and classification trees
//!
//! Trees grow greedily: at each node every feature is scanned in sorted order
//! and the threshold with the largest impurity decrease is chosen. Regression
//! trees use the sum of squared deviations; classification trees use
//! `n * Gini`.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::design::DesignData;
use crate::pipeline::error::{PipelineError, PipelineResult};

/// Values closer than this are treated as ties and never split apart
const TIE_TOLERANCE: f64 = 1e-10;

/// Growth controls for a tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TreeConfig {
    /// Minimum rows in a node before a split is attempted
    pub min_split: usize,
    /// Minimum rows in either child of a split
    pub min_bucket: usize,
    pub max_depth: usize,
    /// Minimum impurity decrease, as a fraction of the root impurity
    pub cp: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::with_min_split(20)
    }
}

impl TreeConfig {
    /// Config with `min_bucket = round(min_split / 3)` (at least 1).
    pub fn with_min_split(min_split: usize) -> Self {
        Self {
            min_split,
            min_bucket: ((min_split as f64 / 3.0).round() as usize).max(1),
            max_depth: 30,
            cp: 0.01,
        }
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.min_split < 2 {
            return Err(PipelineError::InvalidConfig(format!(
                "min_split must be at least 2, got {}",
                self.min_split
            )));
        }
        if self.min_bucket == 0 {
            return Err(PipelineError::InvalidConfig(
                "min_bucket must be at least 1".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.cp) {
            return Err(PipelineError::InvalidConfig(format!(
                "cp must be in [0, 1), got {}",
                self.cp
            )));
        }
        Ok(())
    }
}

/// Splitting criterion and response interpretation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeKind {
    Regression,
    Classification { classes: Vec<String> },
}

/// Split chosen at an internal node. Rows with `value < threshold` go left.
#[derive(Debug, Clone, Serialize)]
pub struct Split {
    pub feature: usize,
    pub feature_name: String,
    pub threshold: f64,
    pub improvement: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
    /// Heap numbering: root 1, children `2k` and `2k + 1`
    pub id: usize,
    pub depth: usize,
    /// Condition that routes rows from the parent into this node
    pub condition: String,
    pub n: usize,
    /// Deviance for regression, `n * Gini` for classification
    pub impurity: f64,
    /// Mean response, or the majority class index
    pub prediction: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub class_counts: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split: Option<Split>,
    #[serde(skip)]
    pub left: Option<usize>,
    #[serde(skip)]
    pub right: Option<usize>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.split.is_none()
    }
}

/// A grown tree with its arena of nodes (index 0 is the root).
#[derive(Debug, Clone, Serialize)]
pub struct DecisionTree {
    pub formula: String,
    pub kind: TreeKind,
    pub config: TreeConfig,
    pub feature_names: Vec<String>,
    pub nodes: Vec<TreeNode>,
    pub n_obs: usize,
    pub rows_omitted: usize,
}

/// Node statistics for the response subset.
enum Response<'a> {
    Continuous(&'a [f64]),
    Classes { labels: &'a [usize], n_classes: usize },
}

struct Candidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

fn gini_impurity(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    let sum_sq: f64 = counts.iter().map(|&c| (c as f64 / n).powi(2)).sum();
    1.0 - sum_sq
}

fn sse(sum: f64, sum_sq: f64, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    (sum_sq - sum * sum / n as f64).max(0.0)
}

impl Response<'_> {
    fn impurity(&self, rows: &[usize]) -> f64 {
        match self {
            Response::Continuous(y) => {
                let sum: f64 = rows.iter().map(|&i| y[i]).sum();
                let sum_sq: f64 = rows.iter().map(|&i| y[i] * y[i]).sum();
                sse(sum, sum_sq, rows.len())
            }
            Response::Classes { labels, n_classes } => {
                let counts = class_counts(labels, *n_classes, rows);
                rows.len() as f64 * gini_impurity(&counts, rows.len())
            }
        }
    }

    fn prediction(&self, rows: &[usize]) -> (f64, Vec<usize>) {
        match self {
            Response::Continuous(y) => {
                let mean = rows.iter().map(|&i| y[i]).sum::<f64>() / rows.len() as f64;
                (mean, Vec::new())
            }
            Response::Classes { labels, n_classes } => {
                let counts = class_counts(labels, *n_classes, rows);
                // Ties resolve to the lowest class index
                let majority = counts
                    .iter()
                    .enumerate()
                    .fold((0usize, 0usize), |best, (k, &c)| if c > best.1 { (k, c) } else { best })
                    .0;
                (majority as f64, counts)
            }
        }
    }

    /// Best threshold on one feature, scanning rows in sorted order.
    fn best_split_on(
        &self,
        x: &[f64],
        rows: &[usize],
        parent_impurity: f64,
        min_bucket: usize,
    ) -> Option<(f64, f64)> {
        let n = rows.len();
        let mut sorted: Vec<usize> = rows.to_vec();
        sorted.sort_by(|&a, &b| x[a].partial_cmp(&x[b]).unwrap_or(std::cmp::Ordering::Equal));

        let mut best: Option<(f64, f64)> = None;

        match self {
            Response::Continuous(y) => {
                let total_sum: f64 = sorted.iter().map(|&i| y[i]).sum();
                let total_sq: f64 = sorted.iter().map(|&i| y[i] * y[i]).sum();
                let mut left_sum = 0.0;
                let mut left_sq = 0.0;

                for k in 0..n - 1 {
                    let yi = y[sorted[k]];
                    left_sum += yi;
                    left_sq += yi * yi;

                    let left_n = k + 1;
                    let right_n = n - left_n;
                    if left_n < min_bucket || right_n < min_bucket {
                        continue;
                    }
                    let (lo, hi) = (x[sorted[k]], x[sorted[k + 1]]);
                    if (hi - lo).abs() < TIE_TOLERANCE {
                        continue;
                    }

                    let child = sse(left_sum, left_sq, left_n)
                        + sse(total_sum - left_sum, total_sq - left_sq, right_n);
                    let gain = parent_impurity - child;
                    if best.map_or(true, |(_, g)| gain > g) {
                        best = Some(((lo + hi) / 2.0, gain));
                    }
                }
            }
            Response::Classes { labels, n_classes } => {
                let total = class_counts(labels, *n_classes, &sorted);
                let mut left = vec![0usize; *n_classes];

                for k in 0..n - 1 {
                    left[labels[sorted[k]]] += 1;

                    let left_n = k + 1;
                    let right_n = n - left_n;
                    if left_n < min_bucket || right_n < min_bucket {
                        continue;
                    }
                    let (lo, hi) = (x[sorted[k]], x[sorted[k + 1]]);
                    if (hi - lo).abs() < TIE_TOLERANCE {
                        continue;
                    }

                    let right: Vec<usize> = total.iter().zip(&left).map(|(t, l)| t - l).collect();
                    let child = left_n as f64 * gini_impurity(&left, left_n)
                        + right_n as f64 * gini_impurity(&right, right_n);
                    let gain = parent_impurity - child;
                    if best.map_or(true, |(_, g)| gain > g) {
                        best = Some(((lo + hi) / 2.0, gain));
                    }
                }
            }
        }

        best
    }
}

fn class_counts(labels: &[usize], n_classes: usize, rows: &[usize]) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &i in rows {
        counts[labels[i]] += 1;
    }
    counts
}

/// Render a class value (`1.0` -> `"1"`) as a label
fn class_label(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

struct Grower<'a> {
    design: &'a DesignData,
    response: Response<'a>,
    config: TreeConfig,
    min_gain: f64,
    nodes: Vec<TreeNode>,
}

impl Grower<'_> {
    fn find_split(&self, rows: &[usize], impurity: f64) -> Option<Candidate> {
        let candidates: Vec<Candidate> = (0..self.design.n_features())
            .into_par_iter()
            .filter_map(|feature| {
                self.response
                    .best_split_on(
                        &self.design.columns[feature],
                        rows,
                        impurity,
                        self.config.min_bucket,
                    )
                    .map(|(threshold, gain)| Candidate {
                        feature,
                        threshold,
                        gain,
                    })
            })
            .collect();

        // Highest gain wins; ties go to the earliest feature
        candidates.into_iter().fold(None, |best: Option<Candidate>, c| match best {
            Some(b) if b.gain >= c.gain => Some(b),
            _ => Some(c),
        })
    }

    fn grow(&mut self, rows: Vec<usize>, id: usize, depth: usize, condition: String) -> usize {
        let impurity = self.response.impurity(&rows);
        let (prediction, class_counts) = self.response.prediction(&rows);
        let index = self.nodes.len();

        self.nodes.push(TreeNode {
            id,
            depth,
            condition,
            n: rows.len(),
            impurity,
            prediction,
            class_counts,
            split: None,
            left: None,
            right: None,
        });

        if rows.len() < self.config.min_split || depth >= self.config.max_depth || impurity <= 0.0 {
            return index;
        }

        let Some(candidate) = self.find_split(&rows, impurity) else {
            return index;
        };
        if candidate.gain <= 0.0 || candidate.gain < self.min_gain {
            return index;
        }

        let feature_name = self.design.feature_names[candidate.feature].clone();
        let x = &self.design.columns[candidate.feature];
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            rows.iter().partition(|&&i| x[i] < candidate.threshold);

        debug!(
            node = id,
            feature = %feature_name,
            threshold = candidate.threshold,
            gain = candidate.gain,
            "split"
        );

        self.nodes[index].split = Some(Split {
            feature: candidate.feature,
            feature_name: feature_name.clone(),
            threshold: candidate.threshold,
            improvement: candidate.gain,
        });

        let left = self.grow(
            left_rows,
            2 * id,
            depth + 1,
            format!("{} < {}", feature_name, format_number(candidate.threshold)),
        );
        let right = self.grow(
            right_rows,
            2 * id + 1,
            depth + 1,
            format!("{} >= {}", feature_name, format_number(candidate.threshold)),
        );
        self.nodes[index].left = Some(left);
        self.nodes[index].right = Some(right);

        index
    }
}

fn format_number(v: f64) -> String {
    if v.abs() >= 1e6 || (v != 0.0 && v.abs() < 1e-3) {
        format!("{:.4e}", v)
    } else {
        let s = format!("{:.4}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn grow_tree(
    design: &DesignData,
    kind: TreeKind,
    labels: Vec<usize>,
    config: TreeConfig,
) -> DecisionTree {
    let response = match &kind {
        TreeKind::Regression => Response::Continuous(&design.response),
        TreeKind::Classification { classes } => Response::Classes {
            labels: &labels,
            n_classes: classes.len(),
        },
    };

    let rows: Vec<usize> = (0..design.n_rows()).collect();
    let root_impurity = response.impurity(&rows);

    let mut grower = Grower {
        design,
        response,
        config,
        min_gain: config.cp * root_impurity,
        nodes: Vec::new(),
    };
    grower.grow(rows, 1, 0, "root".to_string());
    let nodes = grower.nodes;

    DecisionTree {
        formula: design.formula(),
        kind,
        config,
        feature_names: design.feature_names.clone(),
        nodes,
        n_obs: design.n_rows(),
        rows_omitted: design.rows_omitted,
    }
}

/// Grow a regression tree on a continuous response.
pub fn fit_regression_tree(
    design: &DesignData,
    config: TreeConfig,
) -> PipelineResult<DecisionTree> {
    config.validate()?;
    Ok(grow_tree(design, TreeKind::Regression, Vec::new(), config))
}

/// Grow a classification tree; distinct response values become the classes.
pub fn fit_classification_tree(
    design: &DesignData,
    config: TreeConfig,
) -> PipelineResult<DecisionTree> {
    config.validate()?;

    let mut values: Vec<f64> = design.response.clone();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    values.dedup();

    if values.len() < 2 {
        return Err(PipelineError::InsufficientData(format!(
            "classification target '{}' has fewer than two classes",
            design.target
        )));
    }

    let labels: Vec<usize> = design
        .response
        .iter()
        .map(|v| values.iter().position(|c| c == v).unwrap_or(0))
        .collect();
    let classes: Vec<String> = values.iter().map(|&v| class_label(v)).collect();

    Ok(grow_tree(
        design,
        TreeKind::Classification { classes },
        labels,
        config,
    ))
}

impl DecisionTree {
    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    pub fn leaves(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter().filter(|n| n.is_leaf())
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    pub fn is_classification(&self) -> bool {
        matches!(self.kind, TreeKind::Classification { .. })
    }

    /// Route one row of encoded feature values to a leaf and return its prediction.
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut node = &self.nodes[0];
        while let (Some(split), Some(left), Some(right)) = (&node.split, node.left, node.right) {
            node = if row[split.feature] < split.threshold {
                &self.nodes[left]
            } else {
                &self.nodes[right]
            };
        }
        node.prediction
    }

    /// Predicted class label (classification trees only).
    pub fn predict_label(&self, row: &[f64]) -> Option<String> {
        match &self.kind {
            TreeKind::Classification { classes } => {
                classes.get(self.predict(row) as usize).cloned()
            }
            TreeKind::Regression => None,
        }
    }

    /// Total impurity decrease attributed to each feature, largest first.
    pub fn variable_importance(&self) -> Vec<(String, f64)> {
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for split in self.nodes.iter().filter_map(|n| n.split.as_ref()) {
            *totals.entry(split.feature_name.as_str()).or_insert(0.0) += split.improvement;
        }
        let mut importance: Vec<(String, f64)> =
            totals.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        importance.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        importance
    }

    /// Training loss: residual deviance for regression, misclassified rows for classification.
    pub fn training_loss(&self) -> f64 {
        match self.kind {
            TreeKind::Regression => self.leaves().map(|n| n.impurity).sum(),
            TreeKind::Classification { .. } => self
                .leaves()
                .map(|n| (n.n - n.class_counts.iter().copied().max().unwrap_or(0)) as f64)
                .sum(),
        }
    }

    fn node_value(&self, node: &TreeNode) -> String {
        match &self.kind {
            TreeKind::Regression => format_number(node.prediction),
            TreeKind::Classification { classes } => classes
                .get(node.prediction as usize)
                .cloned()
                .unwrap_or_default(),
        }
    }

    fn node_loss(&self, node: &TreeNode) -> f64 {
        match self.kind {
            TreeKind::Regression => node.impurity,
            TreeKind::Classification { .. } => {
                (node.n - node.class_counts.iter().copied().max().unwrap_or(0)) as f64
            }
        }
    }

    /// Short text summary: formula, size, training error, importance.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let label = if self.is_classification() {
            "Classification tree"
        } else {
            "Regression tree"
        };
        let _ = writeln!(out, "{}: {}", label, self.formula);

        let used: Vec<String> = self.variable_importance().into_iter().map(|(k, _)| k).collect();
        let _ = writeln!(
            out,
            "Variables actually used in tree construction: {}",
            if used.is_empty() {
                "(none)".to_string()
            } else {
                used.join(", ")
            }
        );
        let leaves = self.leaf_count();
        let _ = writeln!(out, "Number of terminal nodes: {}", leaves);
        let _ = writeln!(
            out,
            "Settings: min_split = {}, min_bucket = {}, cp = {}",
            self.config.min_split, self.config.min_bucket, self.config.cp
        );

        let loss = self.training_loss();
        match self.kind {
            TreeKind::Regression => {
                let denom = self.n_obs.saturating_sub(leaves).max(1);
                let _ = writeln!(
                    out,
                    "Residual mean deviance: {} = {} / {}",
                    format_number(loss / denom as f64),
                    format_number(loss),
                    denom
                );
            }
            TreeKind::Classification { .. } => {
                let _ = writeln!(
                    out,
                    "Misclassification error rate: {:.4} = {} / {}",
                    loss / self.n_obs as f64,
                    loss as usize,
                    self.n_obs
                );
            }
        }
        if self.rows_omitted > 0 {
            let _ = writeln!(
                out,
                "({} observation(s) deleted due to missingness)",
                self.rows_omitted
            );
        }

        out
    }

    /// Indented listing of every node, depth-first.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "n = {}", self.n_obs);
        let _ = writeln!(out);
        if self.is_classification() {
            let _ = writeln!(out, "node), split, n, loss, yval, (yprob)");
        } else {
            let _ = writeln!(out, "node), split, n, deviance, yval");
        }
        let _ = writeln!(out, "      * denotes terminal node");
        let _ = writeln!(out);
        self.render_node(0, &mut out);
        out
    }

    fn render_node(&self, index: usize, out: &mut String) {
        let node = &self.nodes[index];
        let indent = "  ".repeat(node.depth);
        let probs = if node.class_counts.is_empty() {
            String::new()
        } else {
            let p: Vec<String> = node
                .class_counts
                .iter()
                .map(|&c| format!("{:.3}", c as f64 / node.n as f64))
                .collect();
            format!(" ({})", p.join(" "))
        };
        let _ = writeln!(
            out,
            "{}{}) {} {} {} {}{}{}",
            indent,
            node.id,
            node.condition,
            node.n,
            format_number(self.node_loss(node)),
            self.node_value(node),
            probs,
            if node.is_leaf() { " *" } else { "" }
        );
        if let (Some(left), Some(right)) = (node.left, node.right) {
            self.render_node(left, out);
            self.render_node(right, out);
        }
    }

    /// Graphviz DOT rendering of the tree.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "digraph tree {{");
        let _ = writeln!(out, "  node [shape=box, fontname=\"Helvetica\"];");

        for node in &self.nodes {
            let header = match &node.split {
                Some(split) => format!(
                    "{} < {}\\n",
                    split.feature_name,
                    format_number(split.threshold)
                ),
                None => String::new(),
            };
            let _ = writeln!(
                out,
                "  n{} [label=\"{}n = {}\\nvalue = {}\"{}];",
                node.id,
                header,
                node.n,
                self.node_value(node),
                if node.is_leaf() {
                    ", style=filled, fillcolor=\"#e8f0fa\""
                } else {
                    ""
                }
            );
        }
        for node in &self.nodes {
            if let (Some(left), Some(right)) = (node.left, node.right) {
                let (from, yes, no) = (node.id, self.nodes[left].id, self.nodes[right].id);
                let _ = writeln!(out, "  n{} -> n{} [label=\"yes\"];", from, yes);
                let _ = writeln!(out, "  n{} -> n{} [label=\"no\"];", from, no);
            }
        }

        let _ = writeln!(out, "}}");
        out
    }
}
