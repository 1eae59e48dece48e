//! Numeric feature containers.
//!
//! Features are opaque to the target featurizers: they are produced by an
//! interpreter or the state featurizer and passed through untouched, except
//! for entity tag ids which are packed here as an `[num_tokens, 1]` dense
//! matrix.

use std::collections::{BTreeMap, HashMap};

use ndarray::Array2;
use tracing::trace;

use super::message::Attribute;

/// Feature-group name -> ordered features for that group.
pub type FeatureGroups = BTreeMap<String, Vec<Features>>;

/// Origin label attached to entity tag id features.
pub const TAG_ID_ORIGIN: &str = "tag_id";

/// Whether a feature describes every token or the whole utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Sequence,
    Sentence,
    /// Integer ids stored one per row.
    Ids,
}

/// Sparse matrix in coordinate form.
#[derive(Debug, Clone)]
pub struct SparseMatrix {
    pub shape: (usize, usize),
    /// `(row, col, value)` triplets in insertion order, at most one per cell.
    pub entries: Vec<(usize, usize, f32)>,
    /// Cell -> position in `entries`.
    cells: HashMap<(usize, usize), usize>,
}

impl PartialEq for SparseMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.entries == other.entries
    }
}

impl SparseMatrix {
    pub fn new(shape: (usize, usize)) -> Self {
        SparseMatrix {
            shape,
            entries: Vec::new(),
            cells: HashMap::new(),
        }
    }

    /// Sets a cell, replacing any previous value. Out-of-shape cells are
    /// dropped.
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        if row >= self.shape.0 || col >= self.shape.1 {
            trace!(row, col, shape = ?self.shape, "dropping out-of-shape sparse entry");
            return;
        }
        match self.cells.get(&(row, col)) {
            Some(&pos) => self.entries[pos].2 = value,
            None => {
                self.cells.insert((row, col), self.entries.len());
                self.entries.push((row, col, value));
            }
        }
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn to_dense(&self) -> Array2<f32> {
        let mut dense = Array2::zeros(self.shape);
        for &(r, c, v) in &self.entries {
            dense[[r, c]] = v;
        }
        dense
    }
}

/// Dense or sparse feature payload.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureMatrix {
    Dense(Array2<f32>),
    Sparse(SparseMatrix),
}

impl FeatureMatrix {
    pub fn shape(&self) -> (usize, usize) {
        match self {
            FeatureMatrix::Dense(m) => m.dim(),
            FeatureMatrix::Sparse(m) => m.shape,
        }
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, FeatureMatrix::Sparse(_))
    }
}

/// One feature matrix for a message attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Features {
    pub kind: FeatureKind,
    pub attribute: Attribute,
    /// Name of the component that produced the features.
    pub origin: String,
    pub matrix: FeatureMatrix,
}

impl Features {
    pub fn new(kind: FeatureKind, attribute: Attribute, origin: &str, matrix: FeatureMatrix) -> Self {
        Features {
            kind,
            attribute,
            origin: origin.to_string(),
            matrix,
        }
    }

    /// Packs per-token tag ids as an `[n, 1]` dense id feature.
    ///
    /// Ids are stored as `f32`, which holds integers exactly up to 2^24.
    /// Tag tables are far smaller than that.
    pub fn from_tag_ids(ids: &[usize]) -> Self {
        let column = Array2::from_shape_fn((ids.len(), 1), |(i, _)| ids[i] as f32);
        Features::new(
            FeatureKind::Ids,
            Attribute::Text,
            TAG_ID_ORIGIN,
            FeatureMatrix::Dense(column),
        )
    }

    /// Reads the per-row ids back from an id feature.
    pub fn tag_ids(&self) -> Option<Vec<usize>> {
        match (&self.kind, &self.matrix) {
            (FeatureKind::Ids, FeatureMatrix::Dense(m)) if m.ncols() == 1 => {
                Some(m.column(0).iter().map(|&v| v as usize).collect())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_ids_pack_as_single_column() {
        let f = Features::from_tag_ids(&[0, 3, 4, 0]);
        assert_eq!(f.matrix.shape(), (4, 1));
        assert_eq!(f.origin, TAG_ID_ORIGIN);
        assert_eq!(f.tag_ids(), Some(vec![0, 3, 4, 0]));
    }

    #[test]
    fn sparse_set_overwrites_and_ignores_out_of_shape() {
        let mut m = SparseMatrix::new((2, 3));
        m.set(0, 1, 1.0);
        m.set(0, 1, 2.0);
        m.set(5, 5, 1.0);
        assert_eq!(m.nnz(), 1);
        let dense = m.to_dense();
        assert_eq!(dense[[0, 1]], 2.0);
        assert_eq!(dense.sum(), 2.0);
    }

    #[test]
    fn sparse_set_keeps_first_insertion_position() {
        let mut m = SparseMatrix::new((3, 3));
        m.set(2, 2, 1.0);
        m.set(0, 0, 1.0);
        m.set(2, 2, 5.0);
        assert_eq!(m.entries, vec![(2, 2, 5.0), (0, 0, 1.0)]);
    }

    #[test]
    fn large_tag_ids_read_back_exactly() {
        let max_exact = 1usize << 24;
        let f = Features::from_tag_ids(&[0, 70_000, max_exact]);
        assert_eq!(f.tag_ids(), Some(vec![0, 70_000, max_exact]));
    }

    #[test]
    fn non_id_features_have_no_tag_ids() {
        let f = Features::new(
            FeatureKind::Sentence,
            Attribute::ActionName,
            "test",
            FeatureMatrix::Sparse(SparseMatrix::new((1, 4))),
        );
        assert!(f.tag_ids().is_none());
        assert!(f.matrix.is_sparse());
    }
}
