//! Core classifier trait and implementations.
//!
//! [`GestureClassifier`] is the interface the gesture loop drives.  It is
//! object-safe and `Send + Sync` so it can be held behind an
//! `Arc<dyn GestureClassifier>`.
//!
//! [`LinearClassifier`] is the shipped implementation: a linear softmax
//! head over grid-pooled RGB mean features, loaded from
//! `gesture-model.json` plus `labels.txt`.  The pretrained model is an
//! opaque external artifact; any engine that produces a score per label can
//! replace this one behind the trait.
//!
//! [`MockClassifier`] (under `#[cfg(test)]`) returns scripted predictions —
//! used to unit-test the gesture loop without model files.

use std::path::Path;

use image::RgbImage;
use serde::Deserialize;
use thiserror::Error;

use super::labels::load_labels;

// ---------------------------------------------------------------------------
// ClassifyError
// ---------------------------------------------------------------------------

/// All errors that can arise from the classification subsystem.
#[derive(Debug, Clone, Error)]
pub enum ClassifyError {
    /// The model file was not found at the given path.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The label file was not found or unreadable.
    #[error("label file not found: {0}")]
    LabelsNotFound(String),

    /// The model file was readable but malformed or inconsistent.
    #[error("bad model: {0}")]
    ModelFormat(String),

    /// The input image is smaller than the pooling grid.
    #[error("input image {got_w}x{got_h} is smaller than the {grid}x{grid} pooling grid")]
    InputTooSmall { got_w: u32, got_h: u32, grid: u32 },
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

/// One classification result: the arg-max label and its confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Index of the winning class in the label list.
    pub index: usize,
    /// Winning label text.
    pub label: String,
    /// Softmax confidence of the winning class, in `[0, 1]`.
    pub confidence: f32,
}

impl Prediction {
    pub fn new(index: usize, label: impl Into<String>, confidence: f32) -> Self {
        Self {
            index,
            label: label.into(),
            confidence,
        }
    }
}

// ---------------------------------------------------------------------------
// GestureClassifier trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for gesture classifiers.
///
/// # Contract
///
/// `image` is the normalized square canvas produced by
/// [`crate::vision::normalize_hand`]; implementations may reject images
/// that do not meet their minimum size.
pub trait GestureClassifier: Send + Sync {
    /// Classify `image` and return the arg-max prediction.
    fn predict(&self, image: &RgbImage) -> Result<Prediction, ClassifyError>;
}

const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn GestureClassifier>) {}
};

// ---------------------------------------------------------------------------
// Softmax
// ---------------------------------------------------------------------------

/// Numerically stable softmax.
pub(crate) fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

// ---------------------------------------------------------------------------
// LinearClassifier
// ---------------------------------------------------------------------------

/// On-disk shape of `gesture-model.json`.
#[derive(Debug, Deserialize)]
struct ModelFile {
    /// Pooling grid side; features are per-cell RGB means, so the feature
    /// vector has `3 * grid * grid` entries.
    grid: u32,
    /// One weight row per class, each `3 * grid * grid` long.
    weights: Vec<Vec<f32>>,
    /// One bias per class.
    bias: Vec<f32>,
}

/// Linear softmax head over grid-pooled RGB mean features.
pub struct LinearClassifier {
    grid: u32,
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
    labels: Vec<String>,
}

impl LinearClassifier {
    /// Load model weights and the label list from disk.
    ///
    /// # Errors
    ///
    /// - [`ClassifyError::ModelNotFound`] — `model_path` does not exist.
    /// - [`ClassifyError::LabelsNotFound`] — `labels_path` missing/unreadable.
    /// - [`ClassifyError::ModelFormat`] — malformed JSON or inconsistent
    ///   weight/bias/label cardinalities.
    pub fn load(model_path: &Path, labels_path: &Path) -> Result<Self, ClassifyError> {
        if !model_path.exists() {
            return Err(ClassifyError::ModelNotFound(
                model_path.display().to_string(),
            ));
        }

        let content = std::fs::read_to_string(model_path)
            .map_err(|e| ClassifyError::ModelNotFound(format!("{}: {e}", model_path.display())))?;
        let model: ModelFile = serde_json::from_str(&content)
            .map_err(|e| ClassifyError::ModelFormat(e.to_string()))?;
        let labels = load_labels(labels_path)?;

        Self::from_parts(model.grid, model.weights, model.bias, labels)
    }

    /// Build a classifier from in-memory parts, validating their shape.
    pub fn from_parts(
        grid: u32,
        weights: Vec<Vec<f32>>,
        bias: Vec<f32>,
        labels: Vec<String>,
    ) -> Result<Self, ClassifyError> {
        if grid == 0 {
            return Err(ClassifyError::ModelFormat("grid must be >= 1".into()));
        }
        if weights.len() != labels.len() || bias.len() != labels.len() {
            return Err(ClassifyError::ModelFormat(format!(
                "{} weight rows / {} biases for {} labels",
                weights.len(),
                bias.len(),
                labels.len()
            )));
        }
        let feature_len = (3 * grid * grid) as usize;
        if let Some(row) = weights.iter().find(|row| row.len() != feature_len) {
            return Err(ClassifyError::ModelFormat(format!(
                "weight row has {} entries, expected {feature_len}",
                row.len()
            )));
        }

        Ok(Self {
            grid,
            weights,
            bias,
            labels,
        })
    }

    /// Labels in model output order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Grid-pooled RGB mean features, each in `[0, 1]`.
    ///
    /// Pooling is over the actual image dimensions, so any input at least
    /// `grid` pixels on each side works regardless of canvas size.
    fn features(&self, image: &RgbImage) -> Vec<f32> {
        let grid = self.grid;
        let (w, h) = (image.width(), image.height());
        let mut features = Vec::with_capacity((3 * grid * grid) as usize);

        for cy in 0..grid {
            for cx in 0..grid {
                let x0 = cx * w / grid;
                let x1 = (cx + 1) * w / grid;
                let y0 = cy * h / grid;
                let y1 = (cy + 1) * h / grid;

                let mut sums = [0f64; 3];
                for y in y0..y1 {
                    for x in x0..x1 {
                        let p = image.get_pixel(x, y).0;
                        sums[0] += f64::from(p[0]);
                        sums[1] += f64::from(p[1]);
                        sums[2] += f64::from(p[2]);
                    }
                }

                let count = f64::from((x1 - x0) * (y1 - y0));
                for sum in sums {
                    features.push((sum / count / 255.0) as f32);
                }
            }
        }

        features
    }
}

impl GestureClassifier for LinearClassifier {
    fn predict(&self, image: &RgbImage) -> Result<Prediction, ClassifyError> {
        let (w, h) = (image.width(), image.height());
        if w < self.grid || h < self.grid {
            return Err(ClassifyError::InputTooSmall {
                got_w: w,
                got_h: h,
                grid: self.grid,
            });
        }

        let features = self.features(image);
        let logits: Vec<f32> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| row.iter().zip(&features).map(|(w, f)| w * f).sum::<f32>() + b)
            .collect();

        let scores = softmax(&logits);
        let (index, &confidence) = scores
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .unwrap_or((0, &0.0));

        Ok(Prediction::new(index, self.labels[index].clone(), confidence))
    }
}

// ---------------------------------------------------------------------------
// MockClassifier  (test-only)
// ---------------------------------------------------------------------------

/// A test double that replays scripted predictions without any model file.
///
/// The script is consumed front to back; once exhausted, the last entry is
/// repeated forever (a loop polling the classifier sees a stable signal).
#[cfg(test)]
pub struct MockClassifier {
    script: std::sync::Mutex<std::collections::VecDeque<Result<Prediction, ClassifyError>>>,
    fallback: Result<Prediction, ClassifyError>,
}

#[cfg(test)]
impl MockClassifier {
    /// Always return the same prediction.
    pub fn always(prediction: Prediction) -> Self {
        Self::sequence(vec![prediction])
    }

    /// Replay `predictions` in order, then repeat the last one.
    pub fn sequence(predictions: Vec<Prediction>) -> Self {
        assert!(!predictions.is_empty(), "script must not be empty");
        let fallback = Ok(predictions.last().cloned().unwrap());
        Self {
            script: std::sync::Mutex::new(predictions.into_iter().map(Ok).collect()),
            fallback,
        }
    }

    /// Always return `error`.
    pub fn failing(error: ClassifyError) -> Self {
        Self {
            script: std::sync::Mutex::new(std::collections::VecDeque::new()),
            fallback: Err(error),
        }
    }
}

#[cfg(test)]
impl GestureClassifier for MockClassifier {
    fn predict(&self, _image: &RgbImage) -> Result<Prediction, ClassifyError> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::tempdir;

    fn two_class_parts() -> (Vec<Vec<f32>>, Vec<f32>, Vec<String>) {
        // grid = 1 → features are [r_mean, g_mean, b_mean].
        let weights = vec![vec![10.0, 0.0, 0.0], vec![0.0, 0.0, 10.0]];
        let bias = vec![0.0, 0.0];
        let labels = vec!["red".to_string(), "blue".to_string()];
        (weights, bias, labels)
    }

    // ---- softmax -----------------------------------------------------------

    #[test]
    fn softmax_sums_to_one() {
        let scores = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn softmax_is_order_preserving() {
        let scores = softmax(&[0.5, 2.5, 1.0]);
        assert!(scores[1] > scores[2]);
        assert!(scores[2] > scores[0]);
    }

    #[test]
    fn softmax_uniform_logits_give_uniform_scores() {
        let scores = softmax(&[3.0, 3.0]);
        assert!((scores[0] - 0.5).abs() < 1e-6);
        assert!((scores[1] - 0.5).abs() < 1e-6);
    }

    // ---- from_parts validation ---------------------------------------------

    #[test]
    fn zero_grid_is_rejected() {
        let (w, b, l) = two_class_parts();
        assert!(matches!(
            LinearClassifier::from_parts(0, w, b, l),
            Err(ClassifyError::ModelFormat(_))
        ));
    }

    #[test]
    fn label_count_mismatch_is_rejected() {
        let (w, b, mut l) = two_class_parts();
        l.push("extra".into());
        assert!(matches!(
            LinearClassifier::from_parts(1, w, b, l),
            Err(ClassifyError::ModelFormat(_))
        ));
    }

    #[test]
    fn wrong_row_length_is_rejected() {
        let (mut w, b, l) = two_class_parts();
        w[0].push(0.0);
        assert!(matches!(
            LinearClassifier::from_parts(1, w, b, l),
            Err(ClassifyError::ModelFormat(_))
        ));
    }

    // ---- prediction --------------------------------------------------------

    #[test]
    fn red_image_predicts_red_class() {
        let (w, b, l) = two_class_parts();
        let clf = LinearClassifier::from_parts(1, w, b, l).unwrap();
        let image = RgbImage::from_pixel(10, 10, Rgb([255, 0, 0]));

        let pred = clf.predict(&image).unwrap();
        assert_eq!(pred.index, 0);
        assert_eq!(pred.label, "red");
        assert!(pred.confidence > 0.99);
    }

    #[test]
    fn blue_image_predicts_blue_class() {
        let (w, b, l) = two_class_parts();
        let clf = LinearClassifier::from_parts(1, w, b, l).unwrap();
        let image = RgbImage::from_pixel(10, 10, Rgb([0, 0, 255]));

        let pred = clf.predict(&image).unwrap();
        assert_eq!(pred.index, 1);
        assert_eq!(pred.label, "blue");
    }

    #[test]
    fn bias_breaks_ties() {
        let weights = vec![vec![0.0; 3], vec![0.0; 3]];
        let bias = vec![0.0, 2.0];
        let labels = vec!["first".to_string(), "second".to_string()];
        let clf = LinearClassifier::from_parts(1, weights, bias, labels).unwrap();

        let image = RgbImage::from_pixel(4, 4, Rgb([128, 128, 128]));
        let pred = clf.predict(&image).unwrap();
        assert_eq!(pred.label, "second");
    }

    #[test]
    fn feature_vector_length_matches_grid() {
        let grid = 4u32;
        let n = (3 * grid * grid) as usize;
        let clf = LinearClassifier::from_parts(
            grid,
            vec![vec![0.0; n]],
            vec![0.0],
            vec!["only".into()],
        )
        .unwrap();
        let image = RgbImage::from_pixel(32, 32, Rgb([10, 20, 30]));
        assert_eq!(clf.features(&image).len(), n);
    }

    #[test]
    fn undersized_image_is_rejected() {
        let grid = 8u32;
        let n = (3 * grid * grid) as usize;
        let clf = LinearClassifier::from_parts(
            grid,
            vec![vec![0.0; n]],
            vec![0.0],
            vec!["only".into()],
        )
        .unwrap();
        let image = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        assert!(matches!(
            clf.predict(&image),
            Err(ClassifyError::InputTooSmall { .. })
        ));
    }

    // ---- load --------------------------------------------------------------

    #[test]
    fn load_missing_model_returns_model_not_found() {
        let dir = tempdir().expect("temp dir");
        let labels = dir.path().join("labels.txt");
        std::fs::write(&labels, "0 Yes\n").unwrap();

        let result = LinearClassifier::load(&dir.path().join("missing.json"), &labels);
        assert!(matches!(result, Err(ClassifyError::ModelNotFound(_))));
    }

    #[test]
    fn load_malformed_json_returns_model_format() {
        let dir = tempdir().expect("temp dir");
        let model = dir.path().join("gesture-model.json");
        let labels = dir.path().join("labels.txt");
        std::fs::write(&model, "{ not json").unwrap();
        std::fs::write(&labels, "0 Yes\n").unwrap();

        let result = LinearClassifier::load(&model, &labels);
        assert!(matches!(result, Err(ClassifyError::ModelFormat(_))));
    }

    #[test]
    fn load_round_trip() {
        let dir = tempdir().expect("temp dir");
        let model = dir.path().join("gesture-model.json");
        let labels = dir.path().join("labels.txt");

        let json = serde_json::json!({
            "grid": 1,
            "weights": [[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
            "bias": [0.0, 0.0],
        });
        std::fs::write(&model, json.to_string()).unwrap();
        std::fs::write(&labels, "0 red\n1 blue\n").unwrap();

        let clf = LinearClassifier::load(&model, &labels).expect("load");
        assert_eq!(clf.labels(), ["red", "blue"]);
    }

    // ---- MockClassifier ----------------------------------------------------

    #[test]
    fn mock_replays_script_then_repeats_last() {
        let clf = MockClassifier::sequence(vec![
            Prediction::new(0, "Yes", 0.95),
            Prediction::new(3, "No", 0.92),
        ]);
        let image = RgbImage::from_pixel(1, 1, Rgb([0, 0, 0]));

        assert_eq!(clf.predict(&image).unwrap().label, "Yes");
        assert_eq!(clf.predict(&image).unwrap().label, "No");
        assert_eq!(clf.predict(&image).unwrap().label, "No");
    }

    #[test]
    fn mock_failing_returns_error() {
        let clf = MockClassifier::failing(ClassifyError::ModelNotFound("x".into()));
        let image = RgbImage::from_pixel(1, 1, Rgb([0, 0, 0]));
        assert!(clf.predict(&image).is_err());
    }

    #[test]
    fn box_dyn_classifier_compiles() {
        let clf: Box<dyn GestureClassifier> =
            Box::new(MockClassifier::always(Prediction::new(0, "Yes", 1.0)));
        let image = RgbImage::from_pixel(1, 1, Rgb([0, 0, 0]));
        let _ = clf.predict(&image);
    }
}
