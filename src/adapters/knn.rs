//! k-nearest-neighbour adapter: `Classifier` backed by a fitted k-NN export.
//!
//! The export carries the training set (`fit_x`, `fit_y`) in scaled
//! space, so prediction is a brute-force neighbour search.
//!
//! # Voting
//!
//! - Neighbours are the `min(k, n)` closest training rows. Equal
//!   distances are ordered by training index.
//! - `uniform` weights give every neighbour one vote; `distance` weights
//!   give `1 / d`, and when any neighbour sits at distance zero only the
//!   exact matches vote.
//! - Ties between classes go to the smallest class value.

use serde::{Deserialize, Serialize};

use crate::ports::{Classifier, InferenceError};

/// Neighbour vote weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Weights {
    #[default]
    Uniform,
    Distance,
}

/// Distance metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Minkowski,
    Euclidean,
    Manhattan,
    Chebyshev,
}

/// k-NN parameters and training set as exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnArtifact {
    pub format_version: u32,
    pub kind: String,
    #[serde(default = "default_neighbors")]
    pub n_neighbors: usize,
    #[serde(default)]
    pub weights: Weights,
    #[serde(default)]
    pub metric: Metric,
    #[serde(default = "default_p")]
    pub p: f64,
    pub classes: Vec<i64>,
    pub fit_x: Vec<Vec<f64>>,
    pub fit_y: Vec<i64>,
}

fn default_neighbors() -> usize {
    5
}

fn default_p() -> f64 {
    2.0
}

/// Artifact `kind` accepted by the loader.
pub const KNN_KIND: &str = "k_neighbors";

/// A validated, immutable k-NN classifier.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    n_neighbors: usize,
    weights: Weights,
    metric: Metric,
    p: f64,
    classes: Vec<i64>,
    fit_x: Vec<Vec<f64>>,
    /// Index into `classes` for each training row.
    fit_class: Vec<usize>,
    n_features: usize,
}

impl KnnClassifier {
    /// Validate an artifact and build the classifier.
    ///
    /// # Errors
    /// Returns a description of the first inconsistency found.
    pub fn from_artifact(artifact: KnnArtifact) -> Result<Self, String> {
        if artifact.format_version != super::ARTIFACT_FORMAT_VERSION {
            return Err(format!(
                "unsupported classifier format_version {} (expected {})",
                artifact.format_version,
                super::ARTIFACT_FORMAT_VERSION
            ));
        }
        if artifact.kind != KNN_KIND {
            return Err(format!(
                "classifier kind '{}' is not supported (expected '{KNN_KIND}')",
                artifact.kind
            ));
        }
        if artifact.n_neighbors == 0 {
            return Err("n_neighbors must be at least 1".into());
        }
        if artifact.metric == Metric::Minkowski && !(artifact.p >= 1.0 && artifact.p.is_finite()) {
            return Err(format!("minkowski p must be a finite value >= 1, got {}", artifact.p));
        }
        if artifact.fit_x.is_empty() {
            return Err("classifier has no training samples".into());
        }
        if artifact.fit_y.len() != artifact.fit_x.len() {
            return Err(format!(
                "fit_y has {} labels for {} training samples",
                artifact.fit_y.len(),
                artifact.fit_x.len()
            ));
        }

        let n_features = artifact.fit_x[0].len();
        if n_features == 0 {
            return Err("training samples have no features".into());
        }
        for (i, row) in artifact.fit_x.iter().enumerate() {
            if row.len() != n_features {
                return Err(format!(
                    "training sample {i} has {} features, expected {n_features}",
                    row.len()
                ));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(format!("training sample {i} contains a non-finite value"));
            }
        }

        let mut classes = artifact.classes;
        classes.sort_unstable();
        classes.dedup();
        if classes.is_empty() {
            return Err("classes is empty".into());
        }

        let fit_class = artifact
            .fit_y
            .iter()
            .map(|y| {
                classes
                    .binary_search(y)
                    .map_err(|_| format!("training label {y} is not listed in classes"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            n_neighbors: artifact.n_neighbors,
            weights: artifact.weights,
            metric: artifact.metric,
            p: artifact.p,
            classes,
            fit_x: artifact.fit_x,
            fit_class,
            n_features,
        })
    }

    #[must_use]
    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    #[must_use]
    pub fn weights(&self) -> Weights {
        self.weights
    }

    #[must_use]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Minkowski power; only meaningful for `Metric::Minkowski`.
    #[must_use]
    pub fn p(&self) -> f64 {
        self.p
    }

    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.fit_x.len()
    }

    #[must_use]
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        let diffs = a.iter().zip(b).map(|(x, y)| (x - y).abs());
        match self.metric {
            Metric::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            Metric::Manhattan => diffs.sum(),
            Metric::Chebyshev => diffs.fold(0.0, f64::max),
            Metric::Minkowski => {
                if self.p == 1.0 {
                    diffs.sum()
                } else if self.p == 2.0 {
                    diffs.map(|d| d * d).sum::<f64>().sqrt()
                } else {
                    diffs.map(|d| d.powf(self.p)).sum::<f64>().powf(1.0 / self.p)
                }
            }
        }
    }

    /// Indices and distances of the nearest training rows, closest first.
    fn neighbors(&self, sample: &[f64]) -> Vec<(usize, f64)> {
        let mut all: Vec<(usize, f64)> = self
            .fit_x
            .iter()
            .enumerate()
            .map(|(i, row)| (i, self.distance(sample, row)))
            .collect();
        all.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        all.truncate(self.n_neighbors.min(self.fit_x.len()));
        all
    }

    /// Weighted vote per class, indexed like `classes`.
    fn votes(&self, neighbors: &[(usize, f64)]) -> Vec<f64> {
        let mut votes = vec![0.0; self.classes.len()];
        match self.weights {
            Weights::Uniform => {
                for &(i, _) in neighbors {
                    votes[self.fit_class[i]] += 1.0;
                }
            }
            Weights::Distance => {
                let exact = neighbors.iter().any(|&(_, d)| d == 0.0);
                for &(i, d) in neighbors {
                    let w = if exact {
                        if d == 0.0 {
                            1.0
                        } else {
                            0.0
                        }
                    } else {
                        1.0 / d
                    };
                    votes[self.fit_class[i]] += w;
                }
            }
        }
        votes
    }

    fn check_sample(&self, sample: &[f64]) -> Result<(), InferenceError> {
        if self.fit_x.is_empty() {
            return Err(InferenceError::EmptyModel);
        }
        if sample.len() != self.n_features {
            return Err(InferenceError::DimensionMismatch {
                expected: self.n_features,
                actual: sample.len(),
            });
        }
        if let Some(index) = sample.iter().position(|v| !v.is_finite()) {
            return Err(InferenceError::NonFiniteInput { index });
        }
        Ok(())
    }
}

impl Classifier for KnnClassifier {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, sample: &[f64]) -> Result<i64, InferenceError> {
        self.predict_with_support(sample).map(|(class, _)| class)
    }

    fn predict_with_support(&self, sample: &[f64]) -> Result<(i64, Option<f64>), InferenceError> {
        self.check_sample(sample)?;

        let neighbors = self.neighbors(sample);
        let votes = self.votes(&neighbors);
        let total: f64 = votes.iter().sum();

        // Strict comparison keeps the smallest class on ties.
        let mut best = 0;
        for (i, &v) in votes.iter().enumerate().skip(1) {
            if v > votes[best] {
                best = i;
            }
        }

        if !(total > 0.0 && total.is_finite()) {
            return Err(InferenceError::Internal(format!(
                "neighbour vote total is {total}"
            )));
        }

        Ok((self.classes[best], Some(votes[best] / total)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(fit_x: Vec<Vec<f64>>, fit_y: Vec<i64>, k: usize) -> KnnArtifact {
        KnnArtifact {
            format_version: 1,
            kind: KNN_KIND.to_string(),
            n_neighbors: k,
            weights: Weights::Uniform,
            metric: Metric::Minkowski,
            p: 2.0,
            classes: vec![0, 1],
            fit_x,
            fit_y,
        }
    }

    fn two_clusters(k: usize) -> KnnClassifier {
        KnnClassifier::from_artifact(artifact(
            vec![
                vec![0.0, 0.0],
                vec![0.1, 0.0],
                vec![0.0, 0.1],
                vec![5.0, 5.0],
                vec![5.1, 5.0],
                vec![5.0, 5.1],
            ],
            vec![0, 0, 0, 1, 1, 1],
            k,
        ))
        .expect("Valid model")
    }

    #[test]
    fn test_predicts_nearest_cluster() {
        let model = two_clusters(3);
        assert_eq!(model.predict(&[0.05, 0.05]).expect("Should predict"), 0);
        assert_eq!(model.predict(&[4.9, 5.2]).expect("Should predict"), 1);
    }

    #[test]
    fn test_vote_share() {
        let model = two_clusters(5);
        let (class, share) = model
            .predict_with_support(&[0.0, 0.0])
            .expect("Should predict");
        assert_eq!(class, 0);
        let share = share.expect("k-NN reports support");
        assert!((share - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_k_larger_than_training_set() {
        let model = two_clusters(50);
        // Three votes each: tie resolves to the smallest class.
        assert_eq!(model.predict(&[5.0, 5.0]).expect("Should predict"), 0);
    }

    #[test]
    fn test_distance_weights_prefer_exact_match() {
        let mut a = artifact(
            vec![vec![1.0], vec![2.0], vec![2.1]],
            vec![1, 0, 0],
            3,
        );
        a.weights = Weights::Distance;
        let model = KnnClassifier::from_artifact(a).expect("Valid model");
        let (class, share) = model.predict_with_support(&[1.0]).expect("Should predict");
        assert_eq!(class, 1);
        assert_eq!(share, Some(1.0));
    }

    #[test]
    fn test_distance_weights_let_close_minority_win() {
        let mut a = artifact(
            vec![vec![0.0], vec![3.0], vec![3.1]],
            vec![0, 1, 1],
            3,
        );
        a.weights = Weights::Distance;
        let model = KnnClassifier::from_artifact(a).expect("Valid model");
        let (class, share) = model.predict_with_support(&[0.5]).expect("Should predict");
        // 1/0.5 against 1/2.5 + 1/2.6
        assert_eq!(class, 0);
        let expected = 2.0 / (2.0 + 1.0 / 2.5 + 1.0 / 2.6);
        assert!((share.expect("Vote share") - expected).abs() < 1e-12);
        assert!((expected - 0.718).abs() < 1e-3);

        // Same neighbours under uniform weights: the majority wins.
        let uniform = KnnClassifier::from_artifact(artifact(
            vec![vec![0.0], vec![3.0], vec![3.1]],
            vec![0, 1, 1],
            3,
        ))
        .expect("Valid model");
        assert_eq!(uniform.predict(&[0.5]).expect("Should predict"), 1);
    }

    #[test]
    fn test_metrics() {
        let mut a = artifact(vec![vec![0.0, 0.0], vec![3.0, 4.0]], vec![0, 1], 1);
        for (metric, p, expected) in [
            (Metric::Euclidean, 2.0, 5.0),
            (Metric::Manhattan, 2.0, 7.0),
            (Metric::Chebyshev, 2.0, 4.0),
            (Metric::Minkowski, 1.0, 7.0),
            (Metric::Minkowski, 3.0, (27.0f64 + 64.0).powf(1.0 / 3.0)),
        ] {
            a.metric = metric;
            a.p = p;
            let model = KnnClassifier::from_artifact(a.clone()).expect("Valid model");
            let d = model.distance(&[0.0, 0.0], &[3.0, 4.0]);
            assert!((d - expected).abs() < 1e-9, "{metric:?} p={p}: {d}");
        }
    }

    #[test]
    fn test_rejects_bad_samples() {
        let model = two_clusters(3);
        assert_eq!(
            model.predict(&[0.0; 30]),
            Err(InferenceError::DimensionMismatch {
                expected: 2,
                actual: 30
            })
        );
        assert_eq!(
            model.predict(&[0.0, f64::NAN]),
            Err(InferenceError::NonFiniteInput { index: 1 })
        );
    }

    #[test]
    fn test_rejects_inconsistent_artifacts() {
        assert!(KnnClassifier::from_artifact(artifact(vec![], vec![], 3)).is_err());
        assert!(KnnClassifier::from_artifact(artifact(vec![vec![0.0]], vec![0, 1], 3)).is_err());
        assert!(KnnClassifier::from_artifact(artifact(
            vec![vec![0.0], vec![0.0, 1.0]],
            vec![0, 1],
            3
        ))
        .is_err());
        assert!(KnnClassifier::from_artifact(artifact(vec![vec![0.0]], vec![7], 3)).is_err());
        assert!(KnnClassifier::from_artifact(artifact(vec![vec![0.0]], vec![0], 0)).is_err());

        let mut bad_kind = artifact(vec![vec![0.0]], vec![0], 1);
        bad_kind.kind = "random_forest".into();
        assert!(KnnClassifier::from_artifact(bad_kind).is_err());

        let mut bad_p = artifact(vec![vec![0.0]], vec![0], 1);
        bad_p.p = 0.5;
        assert!(KnnClassifier::from_artifact(bad_p).is_err());
    }

    #[test]
    fn test_parses_exported_json_with_defaults() {
        let json = r#"{
            "format_version": 1,
            "kind": "k_neighbors",
            "classes": [0, 1],
            "fit_x": [[0.0], [1.0]],
            "fit_y": [0, 1]
        }"#;
        let artifact: KnnArtifact = serde_json::from_str(json).expect("Should parse");
        let model = KnnClassifier::from_artifact(artifact).expect("Valid model");
        assert_eq!(model.n_neighbors(), 5);
        assert_eq!(model.weights(), Weights::Uniform);
        assert_eq!(model.metric(), Metric::Minkowski);
        assert_eq!(model.n_samples(), 2);
        assert_eq!(model.classes(), &[0, 1]);
    }
}
