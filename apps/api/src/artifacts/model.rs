//! Regression models, loaded from the fitted model export.
//!
//! Linear models carry their coefficients directly. Tree models use the flat
//! node-array layout of a fitted scikit-learn tree: node `i` is a leaf when
//! `children_left[i] == -1`, otherwise samples with
//! `x[feature[i]] <= threshold[i]` go left.

use serde::{Deserialize, Serialize};

use crate::artifacts::ArtifactError;

const LEAF: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub coef: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    fn predict(&self, x: &[f64]) -> f64 {
        self.intercept + self.coef.iter().zip(x).map(|(c, v)| c * v).sum::<f64>()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl Tree {
    fn validate(&self, n_features: usize) -> Result<(), ArtifactError> {
        let n = self.children_left.len();
        if n == 0 {
            return Err(ArtifactError::Inconsistent("tree has no nodes".to_string()));
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err(ArtifactError::Inconsistent(
                "tree node arrays differ in length".to_string(),
            ));
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF && right == LEAF {
                continue;
            }
            // Children always come after their parent, so traversal terminates.
            let child_ok = |c: i64| c > node as i64 && (c as usize) < n;
            if !child_ok(left) || !child_ok(right) {
                return Err(ArtifactError::Inconsistent(format!(
                    "tree node {node} has out-of-range children ({left}, {right})"
                )));
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(ArtifactError::Inconsistent(format!(
                    "tree node {node} splits on feature {feature}, model has {n_features}"
                )));
            }
        }
        Ok(())
    }

    fn predict(&self, x: &[f64]) -> f64 {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            node = if x[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        self.value[node]
    }
}

/// A fitted regression model, tagged by its scikit-learn class name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "model_type")]
pub enum RegressionModel {
    LinearRegression(LinearModel),
    Ridge(LinearModel),
    Lasso(LinearModel),
    DecisionTreeRegressor {
        n_features: usize,
        tree: Tree,
    },
    RandomForestRegressor {
        n_features: usize,
        trees: Vec<Tree>,
    },
    GradientBoostingRegressor {
        n_features: usize,
        init: f64,
        learning_rate: f64,
        trees: Vec<Tree>,
    },
}

impl RegressionModel {
    pub fn type_name(&self) -> &'static str {
        match self {
            RegressionModel::LinearRegression(_) => "LinearRegression",
            RegressionModel::Ridge(_) => "Ridge",
            RegressionModel::Lasso(_) => "Lasso",
            RegressionModel::DecisionTreeRegressor { .. } => "DecisionTreeRegressor",
            RegressionModel::RandomForestRegressor { .. } => "RandomForestRegressor",
            RegressionModel::GradientBoostingRegressor { .. } => "GradientBoostingRegressor",
        }
    }

    /// Width of the feature vector the model expects.
    pub fn n_features(&self) -> usize {
        match self {
            RegressionModel::LinearRegression(m)
            | RegressionModel::Ridge(m)
            | RegressionModel::Lasso(m) => m.coef.len(),
            RegressionModel::DecisionTreeRegressor { n_features, .. }
            | RegressionModel::RandomForestRegressor { n_features, .. }
            | RegressionModel::GradientBoostingRegressor { n_features, .. } => *n_features,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ArtifactError> {
        let n_features = self.n_features();
        match self {
            RegressionModel::LinearRegression(_)
            | RegressionModel::Ridge(_)
            | RegressionModel::Lasso(_) => Ok(()),
            RegressionModel::DecisionTreeRegressor { tree, .. } => tree.validate(n_features),
            RegressionModel::RandomForestRegressor { trees, .. } => {
                if trees.is_empty() {
                    return Err(ArtifactError::Inconsistent(
                        "random forest has no trees".to_string(),
                    ));
                }
                trees.iter().try_for_each(|t| t.validate(n_features))
            }
            RegressionModel::GradientBoostingRegressor { trees, .. } => {
                trees.iter().try_for_each(|t| t.validate(n_features))
            }
        }
    }

    /// Predicts a single row. `x.len()` must equal `n_features()`.
    pub fn predict(&self, x: &[f64]) -> f64 {
        match self {
            RegressionModel::LinearRegression(m)
            | RegressionModel::Ridge(m)
            | RegressionModel::Lasso(m) => m.predict(x),
            RegressionModel::DecisionTreeRegressor { tree, .. } => tree.predict(x),
            RegressionModel::RandomForestRegressor { trees, .. } => {
                trees.iter().map(|t| t.predict(x)).sum::<f64>() / trees.len() as f64
            }
            RegressionModel::GradientBoostingRegressor {
                init,
                learning_rate,
                trees,
                ..
            } => init + learning_rate * trees.iter().map(|t| t.predict(x)).sum::<f64>(),
        }
    }
}
