//! Ensemble-of-regression-trees landmark predictor.
//!
//! Starts from the model's mean shape, then runs a cascade of forests. Each
//! cascade samples pixel intensities at offsets anchored to the current
//! shape (the offsets follow the shape's rotation and scale relative to the
//! mean shape), and every tree in the forest adds its leaf's shape delta.
//! Shapes live in region-normalized coordinates: (0, 0) is the region's
//! top-left corner and (1, 1) its bottom-right.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detection::domain::landmark_predictor::LandmarkPredictor;
use crate::shared::error::BoxError;
use crate::shared::geometry::RawRegion;
use crate::shared::image::Image;

/// Pixel-difference test at an inner tree node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitFeature {
    pub idx1: usize,
    pub idx2: usize,
    pub thresh: f32,
}

/// Complete binary tree stored breadth-first: node `i` has children
/// `2i + 1` (feature difference above threshold) and `2i + 2`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub splits: Vec<SplitFeature>,
    /// One shape delta per leaf, `splits.len() + 1` leaves.
    pub leaf_values: Vec<Vec<[f32; 2]>>,
}

impl RegressionTree {
    fn leaf(&self, features: &[f32]) -> &[[f32; 2]] {
        let mut i = 0;
        while i < self.splits.len() {
            let s = &self.splits[i];
            i = if features[s.idx1] - features[s.idx2] > s.thresh {
                2 * i + 1
            } else {
                2 * i + 2
            };
        }
        &self.leaf_values[i - self.splits.len()]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cascade {
    /// Landmark each feature pixel is anchored to.
    pub anchor_idx: Vec<usize>,
    /// Offset of each feature pixel from its anchor, in mean-shape space.
    pub deltas: Vec<[f32; 2]>,
    pub forest: Vec<RegressionTree>,
}

/// Serialized model artifact (JSON).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapePredictorModel {
    pub mean_shape: Vec<[f32; 2]>,
    pub cascades: Vec<Cascade>,
}

impl ShapePredictorModel {
    fn validate(&self) -> Result<(), String> {
        let landmarks = self.mean_shape.len();
        for (c, cascade) in self.cascades.iter().enumerate() {
            let features = cascade.anchor_idx.len();
            if cascade.deltas.len() != features {
                return Err(format!(
                    "cascade {c}: {} deltas for {features} anchors",
                    cascade.deltas.len()
                ));
            }
            if let Some(&a) = cascade.anchor_idx.iter().find(|&&a| a >= landmarks) {
                return Err(format!("cascade {c}: anchor {a} out of range"));
            }
            for (t, tree) in cascade.forest.iter().enumerate() {
                if tree.leaf_values.len() != tree.splits.len() + 1 {
                    return Err(format!(
                        "cascade {c} tree {t}: {} leaves for {} splits",
                        tree.leaf_values.len(),
                        tree.splits.len()
                    ));
                }
                if tree
                    .splits
                    .iter()
                    .any(|s| s.idx1 >= features || s.idx2 >= features)
                {
                    return Err(format!("cascade {c} tree {t}: feature index out of range"));
                }
                if tree.leaf_values.iter().any(|l| l.len() != landmarks) {
                    return Err(format!(
                        "cascade {c} tree {t}: leaf size differs from {landmarks} landmarks"
                    ));
                }
            }
        }
        Ok(())
    }
}

pub struct ErtShapePredictor {
    model: ShapePredictorModel,
}

impl ErtShapePredictor {
    pub fn new(model: ShapePredictorModel) -> Result<Self, BoxError> {
        model.validate()?;
        Ok(Self { model })
    }

    /// Deserializes and validates a model file.
    pub fn from_path(path: &Path) -> Result<Self, BoxError> {
        let reader = BufReader::new(File::open(path)?);
        let model: ShapePredictorModel = serde_json::from_reader(reader)?;
        Self::new(model)
    }

    pub fn landmark_count(&self) -> usize {
        self.model.mean_shape.len()
    }

    fn extract_features(
        &self,
        image: &Image,
        region: &RawRegion,
        shape: &[[f32; 2]],
        cascade: &Cascade,
    ) -> Vec<f32> {
        let (a, b) = similarity_transform(&self.model.mean_shape, shape);
        cascade
            .anchor_idx
            .iter()
            .zip(&cascade.deltas)
            .map(|(&anchor, d)| {
                let u = shape[anchor][0] + a * d[0] - b * d[1];
                let v = shape[anchor][1] + b * d[0] + a * d[1];
                let (x, y) = region.unnormalize((u as f64, v as f64));
                sample(image, x, y)
            })
            .collect()
    }
}

impl LandmarkPredictor for ErtShapePredictor {
    fn predict(&self, image: &Image, region: &RawRegion) -> Result<Vec<(f64, f64)>, BoxError> {
        let mut shape = self.model.mean_shape.clone();
        for cascade in &self.model.cascades {
            let features = self.extract_features(image, region, &shape, cascade);
            for tree in &cascade.forest {
                for (p, d) in shape.iter_mut().zip(tree.leaf(&features)) {
                    p[0] += d[0];
                    p[1] += d[1];
                }
            }
        }
        Ok(shape
            .iter()
            .map(|p| region.unnormalize((p[0] as f64, p[1] as f64)))
            .collect())
    }
}

/// Least-squares rotation+scale taking `from` onto `to`, returned as the
/// `(a, b)` of the matrix `[[a, -b], [b, a]]`. Translation is discarded.
fn similarity_transform(from: &[[f32; 2]], to: &[[f32; 2]]) -> (f32, f32) {
    let n = from.len().min(to.len());
    if n == 0 {
        return (1.0, 0.0);
    }
    let centroid = |pts: &[[f32; 2]]| {
        let (sx, sy) = pts[..n]
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
        (sx / n as f32, sy / n as f32)
    };
    let (fx, fy) = centroid(from);
    let (tx, ty) = centroid(to);

    let (mut dot, mut cross, mut norm) = (0.0f32, 0.0f32, 0.0f32);
    for (p, q) in from[..n].iter().zip(&to[..n]) {
        let (px, py) = (p[0] - fx, p[1] - fy);
        let (qx, qy) = (q[0] - tx, q[1] - ty);
        dot += px * qx + py * qy;
        cross += px * qy - py * qx;
        norm += px * px + py * py;
    }
    if norm == 0.0 {
        return (1.0, 0.0);
    }
    (dot / norm, cross / norm)
}

/// Intensity at the nearest pixel; 0 outside the image.
fn sample(image: &Image, x: f64, y: f64) -> f32 {
    let (xi, yi) = (x.round(), y.round());
    if xi < 0.0 || yi < 0.0 || xi >= image.width() as f64 || yi >= image.height() as f64 {
        return 0.0;
    }
    image.intensity(xi as u32, yi as u32) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// 10x10 grayscale: columns 0..5 bright, 5..10 dark.
    fn split_image() -> Image {
        let mut data = vec![0u8; 100];
        for row in 0..10 {
            for col in 0..5 {
                data[row * 10 + col] = 200;
            }
        }
        Image::new(data, 10, 10, 1)
    }

    fn stump(thresh: f32, left: [f32; 2], right: [f32; 2]) -> RegressionTree {
        RegressionTree {
            splits: vec![SplitFeature {
                idx1: 0,
                idx2: 1,
                thresh,
            }],
            leaf_values: vec![vec![left], vec![right]],
        }
    }

    fn single_point_model(forest: Vec<RegressionTree>) -> ShapePredictorModel {
        ShapePredictorModel {
            mean_shape: vec![[0.5, 0.5]],
            cascades: vec![Cascade {
                anchor_idx: vec![0, 0],
                deltas: vec![[-0.3, 0.0], [0.3, 0.0]],
                forest,
            }],
        }
    }

    #[test]
    fn test_no_cascades_returns_mean_shape_in_region() {
        let model = ShapePredictorModel {
            mean_shape: vec![[0.0, 0.0], [0.5, 0.25], [1.0, 1.0]],
            cascades: Vec::new(),
        };
        let predictor = ErtShapePredictor::new(model).unwrap();
        let region = RawRegion::new(10.0, 20.0, 40.0, 80.0);

        let points = predictor.predict(&split_image(), &region).unwrap();

        assert_eq!(points, vec![(10.0, 20.0), (30.0, 40.0), (50.0, 100.0)]);
        assert_eq!(predictor.landmark_count(), 3);
    }

    #[test]
    fn test_tree_follows_pixel_difference() {
        // feature 0 samples column 2 (bright), feature 1 column 8 (dark)
        let model = single_point_model(vec![stump(50.0, [0.1, 0.0], [-0.1, 0.0])]);
        let predictor = ErtShapePredictor::new(model).unwrap();
        let region = RawRegion::new(0.0, 0.0, 10.0, 10.0);

        let points = predictor.predict(&split_image(), &region).unwrap();

        assert_relative_eq!(points[0].0, 6.0, epsilon = 1e-4);
        assert_relative_eq!(points[0].1, 5.0, epsilon = 1e-4);
    }

    #[test]
    fn test_threshold_not_exceeded_takes_right_child() {
        let model = single_point_model(vec![stump(250.0, [0.1, 0.0], [-0.1, 0.0])]);
        let predictor = ErtShapePredictor::new(model).unwrap();
        let region = RawRegion::new(0.0, 0.0, 10.0, 10.0);

        let points = predictor.predict(&split_image(), &region).unwrap();

        assert_relative_eq!(points[0].0, 4.0, epsilon = 1e-4);
    }

    #[test]
    fn test_forest_accumulates_leaf_deltas() {
        let model = single_point_model(vec![
            stump(50.0, [0.1, 0.0], [0.0, 0.0]),
            stump(50.0, [0.0, 0.2], [0.0, 0.0]),
        ]);
        let predictor = ErtShapePredictor::new(model).unwrap();
        let region = RawRegion::new(0.0, 0.0, 10.0, 10.0);

        let points = predictor.predict(&split_image(), &region).unwrap();

        assert_relative_eq!(points[0].0, 6.0, epsilon = 1e-4);
        assert_relative_eq!(points[0].1, 7.0, epsilon = 1e-4);
    }

    #[test]
    fn test_samples_outside_image_read_zero() {
        let img = split_image();
        assert_relative_eq!(sample(&img, -1.0, 3.0), 0.0);
        assert_relative_eq!(sample(&img, 3.0, 10.0), 0.0);
        assert_relative_eq!(sample(&img, 1.4, 1.0), 200.0);
    }

    #[test]
    fn test_similarity_identity() {
        let shape = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let (a, b) = similarity_transform(&shape, &shape);
        assert_relative_eq!(a, 1.0, epsilon = 1e-6);
        assert_relative_eq!(b, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_similarity_rotation_and_scale() {
        // to = 2 * rot90(from) + translation
        let from = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let to = [[5.0, 5.0], [5.0, 7.0], [3.0, 5.0]];
        let (a, b) = similarity_transform(&from, &to);
        assert_relative_eq!(a, 0.0, epsilon = 1e-5);
        assert_relative_eq!(b, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_similarity_degenerate_is_identity() {
        let from = [[1.0, 1.0], [1.0, 1.0]];
        let to = [[3.0, 2.0], [4.0, 2.0]];
        assert_eq!(similarity_transform(&from, &to), (1.0, 0.0));
    }

    #[test]
    fn test_validate_rejects_leaf_count_mismatch() {
        let mut tree = stump(0.0, [0.0, 0.0], [0.0, 0.0]);
        tree.leaf_values.pop();
        assert!(ErtShapePredictor::new(single_point_model(vec![tree])).is_err());
    }

    #[test]
    fn test_validate_rejects_anchor_out_of_range() {
        let mut model = single_point_model(Vec::new());
        model.cascades[0].anchor_idx = vec![0, 3];
        assert!(ErtShapePredictor::new(model).is_err());
    }

    #[test]
    fn test_from_path_roundtrips_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = single_point_model(vec![stump(50.0, [0.1, 0.0], [-0.1, 0.0])]);
        std::fs::write(&path, serde_json::to_string(&model).unwrap()).unwrap();

        let predictor = ErtShapePredictor::from_path(&path).unwrap();

        assert_eq!(predictor.landmark_count(), 1);
    }

    #[test]
    fn test_from_path_missing_file_errors() {
        assert!(ErtShapePredictor::from_path(Path::new("/nonexistent/model.json")).is_err());
    }

    #[test]
    fn test_from_path_malformed_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, b"\x00\x01 not a model").unwrap();
        assert!(ErtShapePredictor::from_path(&path).is_err());
    }
}
