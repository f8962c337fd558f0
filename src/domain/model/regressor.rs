//! Gradient-boosted regression trees read from an XGBoost JSON model
//! (`Booster.save_model("model.json")`).
//!
//! Only the parts needed for inference are decoded: the base score, the
//! declared feature count and each tree's node arrays. A node `i` is a leaf
//! when `left_children[i] == -1`, in which case `split_conditions[i]` holds
//! the leaf value. Internal nodes send `x < split_condition` left and a NaN
//! input along `default_left`.
//!
//! XGBoost holds inputs, thresholds and leaves as `f32`, so inputs are
//! narrowed before any comparison and leaves are accumulated in `f32`.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ModelFile {
    learner: Learner,
}

#[derive(Debug, Deserialize)]
struct Learner {
    #[serde(default)]
    feature_names: Vec<String>,
    gradient_booster: GradientBooster,
    learner_model_param: LearnerModelParam,
    #[serde(default)]
    objective: Option<Objective>,
}

#[derive(Debug, Deserialize)]
struct GradientBooster {
    model: BoosterModel,
}

#[derive(Debug, Deserialize)]
struct BoosterModel {
    trees: Vec<TreeFile>,
}

#[derive(Debug, Deserialize)]
struct LearnerModelParam {
    base_score: String,
    num_feature: String,
}

#[derive(Debug, Deserialize)]
struct Objective {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TreeFile {
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<u32>,
    split_conditions: Vec<f32>,
    #[serde(default)]
    default_left: Vec<Flag>,
}

/// Older models store `default_left` as booleans, newer ones as 0/1.
#[derive(Debug, Clone, Copy, Deserialize)]
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

/// Objectives whose prediction is the raw margin.
const IDENTITY_OBJECTIVES: &[&str] = &[
    "reg:squarederror",
    "reg:linear",
    "reg:absoluteerror",
    "reg:pseudohubererror",
];

#[derive(Debug, Clone, PartialEq)]
struct RegressionTree {
    left: Vec<i32>,
    right: Vec<i32>,
    split_index: Vec<usize>,
    split_condition: Vec<f32>,
    default_left: Vec<bool>,
}

impl RegressionTree {
    fn from_file(tree: TreeFile, num_features: usize, tree_idx: usize) -> Result<Self, String> {
        let nodes = tree.left_children.len();
        if nodes == 0 {
            return Err(format!("tree {} has no nodes", tree_idx));
        }
        if tree.right_children.len() != nodes
            || tree.split_indices.len() != nodes
            || tree.split_conditions.len() != nodes
        {
            return Err(format!("tree {}: node array length mismatch", tree_idx));
        }

        for node in 0..nodes {
            let (l, r) = (tree.left_children[node], tree.right_children[node]);
            if l == -1 {
                continue;
            }
            // Children always come after their parent, which also rules out cycles.
            for child in [l, r] {
                if child <= node as i32 || child as usize >= nodes {
                    return Err(format!(
                        "tree {}: node {} has invalid child {}",
                        tree_idx, node, child
                    ));
                }
            }
            if tree.split_indices[node] as usize >= num_features {
                return Err(format!(
                    "tree {}: node {} splits on feature {} of {}",
                    tree_idx, node, tree.split_indices[node], num_features
                ));
            }
        }

        let default_left = if tree.default_left.is_empty() {
            vec![true; nodes]
        } else if tree.default_left.len() == nodes {
            tree.default_left.iter().map(|f| f.is_set()).collect()
        } else {
            return Err(format!("tree {}: default_left length mismatch", tree_idx));
        };

        Ok(Self {
            left: tree.left_children,
            right: tree.right_children,
            split_index: tree.split_indices.into_iter().map(|i| i as usize).collect(),
            split_condition: tree.split_conditions,
            default_left,
        })
    }

    fn predict(&self, features: &[f32]) -> f32 {
        let mut node = 0usize;
        loop {
            if self.left[node] == -1 {
                return self.split_condition[node];
            }
            let x = features[self.split_index[node]];
            let go_left = if x.is_nan() {
                self.default_left[node]
            } else {
                x < self.split_condition[node]
            };
            let next = if go_left { self.left[node] } else { self.right[node] };
            node = next as usize;
        }
    }
}

/// Tree ensemble whose prediction is `base_score + Σ leaf`.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientBoostedTrees {
    base_score: f32,
    num_features: usize,
    feature_names: Vec<String>,
    trees: Vec<RegressionTree>,
}

impl GradientBoostedTrees {
    pub fn from_json(text: &str) -> Result<Self, String> {
        let file: ModelFile =
            serde_json::from_str(text).map_err(|e| format!("invalid model JSON: {}", e))?;
        let learner = file.learner;

        if let Some(objective) = &learner.objective {
            if !IDENTITY_OBJECTIVES.contains(&objective.name.as_str()) {
                return Err(format!("unsupported objective {}", objective.name));
            }
        }

        let base_score = parse_param(&learner.learner_model_param.base_score)
            .ok_or_else(|| "invalid base_score".to_string())?;
        let num_features = learner
            .learner_model_param
            .num_feature
            .trim()
            .parse::<usize>()
            .map_err(|_| "invalid num_feature".to_string())?;

        if learner.gradient_booster.model.trees.is_empty() {
            return Err("model contains no trees".into());
        }

        let trees = learner
            .gradient_booster
            .model
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, t)| RegressionTree::from_file(t, num_features, i))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            base_score,
            num_features,
            feature_names: learner.feature_names,
            trees,
        })
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Feature names recorded at training time; empty when the model was
    /// trained on an unnamed matrix.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// `features` must hold at least `num_features()` values.
    pub fn predict(&self, features: &[f64]) -> f64 {
        let features: Vec<f32> = features.iter().map(|&x| x as f32).collect();
        let margin = self
            .trees
            .iter()
            .fold(self.base_score, |acc, tree| acc + tree.predict(&features));
        f64::from(margin)
    }
}

/// XGBoost writes scalar params as strings, sometimes wrapped in brackets
/// ("5E-1", "[1.2E2]").
fn parse_param(raw: &str) -> Option<f32> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
}
