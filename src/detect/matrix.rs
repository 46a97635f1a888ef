// Feature matrix and column standardization.
//
// Raw features live on wildly different scales (character length in the
// hundreds, ratios in [0, 1], flags in {0, 1}). Both detectors measure
// distances or split ranges across columns, so every column is rescaled to
// zero mean and unit variance before either detector sees it.
//
// Rows are kept here in the pipeline's canonical order and handed to
// aprender as a `Matrix<f32>` only at the point a detector needs one.

use aprender::preprocessing::StandardScaler;
use aprender::primitives::Matrix;
use aprender::traits::Transformer;

use crate::error::DetectError;
use crate::features::FeatureVector;

/// Dense row-major matrix of detector inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    /// Build from rows of equal length. Returns None on ragged input.
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.iter().any(|r| r.len() != cols) {
            return None;
        }
        Some(Self {
            rows: rows.len(),
            cols,
            data: rows.iter().flatten().copied().collect(),
        })
    }

    /// One row per feature vector. The column count comes from the feature
    /// layout, so an empty batch still has the right width.
    pub fn from_features(features: &[FeatureVector], include_engagement: bool) -> Self {
        let cols = FeatureVector::column_names(include_engagement).len();
        Self {
            rows: features.len(),
            cols,
            data: features
                .iter()
                .flat_map(|fv| fv.to_row(include_engagement))
                .collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// True when every row equals the first one (vacuously true for fewer
    /// than two rows). Such a matrix has nothing for a detector to find.
    pub fn is_uniform(&self) -> bool {
        match self.data.get(..self.cols) {
            Some(first) if self.cols > 0 => self.data.chunks(self.cols).all(|row| row == first),
            _ => true,
        }
    }

    /// Copy into aprender's matrix type.
    pub fn to_matrix(&self) -> Result<Matrix<f32>, DetectError> {
        let data: Vec<f32> = self.data.iter().map(|&v| v as f32).collect();
        Matrix::from_vec(self.rows, self.cols, data).map_err(|e| DetectError::Matrix(e.to_string()))
    }

    fn from_matrix(matrix: &Matrix<f32>) -> Self {
        let (rows, cols) = matrix.shape();
        let data = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (r, c)))
            .map(|(r, c)| f64::from(matrix.get(r, c)))
            .collect();
        Self { rows, cols, data }
    }

    /// Column-wise z-scores through aprender's `StandardScaler`.
    ///
    /// A constant column carries no information and becomes all zeros
    /// rather than a division by zero. With fewer than two rows every
    /// column is constant.
    pub fn standardize(&self) -> Result<FeatureMatrix, DetectError> {
        if self.rows < 2 {
            return Ok(FeatureMatrix {
                rows: self.rows,
                cols: self.cols,
                data: vec![0.0; self.data.len()],
            });
        }

        let features = self.to_matrix()?;
        let mut scaler = StandardScaler::new().with_mean(true).with_std(true);
        scaler
            .fit(&features)
            .map_err(|e| DetectError::Scaler(e.to_string()))?;
        let normalized = scaler
            .transform(&features)
            .map_err(|e| DetectError::Scaler(e.to_string()))?;

        let mut standardized = Self::from_matrix(&normalized);
        let constant: Vec<bool> = scaler.std().iter().map(|&s| s <= f32::EPSILON).collect();
        for (i, value) in standardized.data.iter_mut().enumerate() {
            if constant.get(i % self.cols).copied().unwrap_or(false) || !value.is_finite() {
                *value = 0.0;
            }
        }
        Ok(standardized)
    }
}
