//! Keyed feature vector stores for contexts and drugs.
//!
//! A [`FeatureSet`] maps entity keys (cell line names, drug identifiers, ...)
//! to dense row vectors of shape `(1, D)`. The entity role is a type
//! parameter, so a [`ContextFeatureSet`] cannot be handed to code expecting a
//! [`DrugFeatureSet`]. All operations live on the [`FeatureStore`] trait.
//!
//! # Example
//!
//! ```
//! use drugpair_data::feature_set::{ContextFeatureSet, FeatureStore};
//!
//! let mut contexts = ContextFeatureSet::new();
//! contexts.set("c1", vec![1.0, 0.0, 0.0]);
//! contexts.set("c2", vec![0.5, 0.5, 0.0]);
//!
//! let matrix = contexts.gather(&["c2", "c1"]).unwrap();
//! assert_eq!(matrix.dim(), (2, 3));
//! assert_eq!(contexts.density(), Some(0.5));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use drugpair_core::{DrugPairError, Result};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Dimension};

/// Marker trait naming the entity class a feature set holds.
pub trait EntityRole {
    /// Human readable role name used in error messages.
    const NAME: &'static str;
}

/// Biological or chemical contexts, such as cell lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Context;

impl EntityRole for Context {
    const NAME: &'static str = "context";
}

/// Drugs and other molecules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Drug;

impl EntityRole for Drug {
    const NAME: &'static str = "drug";
}

/// Conversion of a numeric vector into a `(1, D)` feature row.
///
/// Arrays of any dimensionality are flattened in logical (row-major) order.
pub trait IntoFeatureRow {
    /// Consumes `self` and returns it reshaped to `(1, D)`.
    fn into_feature_row(self) -> Array2<f32>;
}

impl IntoFeatureRow for Vec<f32> {
    fn into_feature_row(self) -> Array2<f32> {
        Array1::from(self).insert_axis(Axis(0))
    }
}

impl IntoFeatureRow for &[f32] {
    fn into_feature_row(self) -> Array2<f32> {
        self.to_vec().into_feature_row()
    }
}

impl<const N: usize> IntoFeatureRow for [f32; N] {
    fn into_feature_row(self) -> Array2<f32> {
        self.to_vec().into_feature_row()
    }
}

impl<S, D> IntoFeatureRow for ArrayBase<S, D>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    fn into_feature_row(self) -> Array2<f32> {
        self.iter().copied().collect::<Vec<f32>>().into_feature_row()
    }
}

impl<S, D> IntoFeatureRow for &ArrayBase<S, D>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    fn into_feature_row(self) -> Array2<f32> {
        self.iter().copied().collect::<Vec<f32>>().into_feature_row()
    }
}

/// The operations every keyed feature store supports.
///
/// Implementors provide storage primitives; matrix assembly and statistics
/// are derived from them.
pub trait FeatureStore {
    /// Returns the entity role name ("context" or "drug").
    fn role(&self) -> &'static str;

    /// Returns the `(1, D)` vector stored under `key`.
    ///
    /// # Errors
    ///
    /// [`DrugPairError::KeyNotFound`] if `key` is absent.
    fn get(&self, key: &str) -> Result<&Array2<f32>>;

    /// Stores `features` reshaped to `(1, D)` under `key`, returning the
    /// previous vector if one was replaced.
    ///
    /// The width is not checked against other entries.
    fn set<K, V>(&mut self, key: K, features: V) -> Option<Array2<f32>>
    where
        K: Into<String>,
        V: IntoFeatureRow;

    /// Removes and returns the vector stored under `key`.
    ///
    /// # Errors
    ///
    /// [`DrugPairError::KeyNotFound`] if `key` is absent.
    fn delete(&mut self, key: &str) -> Result<Array2<f32>>;

    /// Returns `true` if `key` is stored.
    fn contains(&self, key: &str) -> bool;

    /// Returns the number of stored keys.
    fn len(&self) -> usize;

    /// Returns a snapshot of `(key, vector)` pairs in storage order.
    fn items(&self) -> Vec<(&str, &Array2<f32>)>;

    /// Returns `true` if nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies [`FeatureStore::set`] for every pair in `data`.
    fn update<I, K, V>(&mut self, data: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoFeatureRow,
    {
        for (key, features) in data {
            self.set(key, features);
        }
    }

    /// Returns a snapshot of the stored keys in storage order.
    fn keys(&self) -> Vec<&str> {
        self.items().into_iter().map(|(key, _)| key).collect()
    }

    /// Returns a snapshot of the stored vectors in storage order.
    fn values(&self) -> Vec<&Array2<f32>> {
        self.items().into_iter().map(|(_, features)| features).collect()
    }

    /// Returns the width `D` of the first stored vector, or 0 when empty.
    ///
    /// Only one entry is inspected, so the value is meaningful only when all
    /// entries share a width.
    fn feature_dimension(&self) -> usize {
        self.items()
            .first()
            .map(|(_, features)| features.ncols())
            .unwrap_or(0)
    }

    /// Stacks the vectors for `keys` into an `(m, D)` matrix, row `i` being
    /// the vector of `keys[i]`.
    ///
    /// An empty key list yields a `(0, D)` matrix with
    /// `D = feature_dimension()`.
    ///
    /// # Errors
    ///
    /// - [`DrugPairError::KeyNotFound`] naming the first absent key.
    /// - [`DrugPairError::InvalidDimension`] if the gathered rows differ in width.
    fn gather<K: AsRef<str>>(&self, keys: &[K]) -> Result<Array2<f32>> {
        let rows = keys
            .iter()
            .map(|key| self.get(key.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let width = match rows.first() {
            Some(first) => first.ncols(),
            None => return Ok(Array2::zeros((0, self.feature_dimension()))),
        };

        let mut matrix = Array2::zeros((rows.len(), width));
        for (i, row) in rows.iter().enumerate() {
            if row.ncols() != width {
                return Err(DrugPairError::InvalidDimension {
                    expected: width,
                    actual: row.ncols(),
                });
            }
            matrix.row_mut(i).assign(&row.row(0));
        }
        Ok(matrix)
    }

    /// Returns the fraction of non-zero entries over all stored vectors.
    ///
    /// The denominator is the number of stored scalars, which equals
    /// `feature_dimension() * len()` when every vector has the same width, so
    /// the result always lies in `[0, 1]`. Returns `None` when the store holds
    /// no scalars. Explicit zeros and missing values are indistinguishable.
    fn density(&self) -> Option<f64> {
        let (non_zero, total) = self
            .values()
            .iter()
            .fold((0usize, 0usize), |(non_zero, total), features| {
                (
                    non_zero + features.iter().filter(|&&x| x != 0.0).count(),
                    total + features.len(),
                )
            });
        if total == 0 {
            return None;
        }
        Some(non_zero as f64 / total as f64)
    }
}

/// A keyed store of `(1, D)` feature vectors for one entity role.
#[derive(Clone, PartialEq)]
pub struct FeatureSet<R> {
    features: BTreeMap<String, Array2<f32>>,
    role: PhantomData<R>,
}

/// Feature vectors for biological/chemical contexts.
pub type ContextFeatureSet = FeatureSet<Context>;

/// Feature vectors for drugs.
pub type DrugFeatureSet = FeatureSet<Drug>;

impl<R: EntityRole> FeatureSet<R> {
    /// Creates an empty feature set.
    pub fn new() -> Self {
        Self {
            features: BTreeMap::new(),
            role: PhantomData,
        }
    }

    /// Creates a feature set from `(key, values)` rows.
    pub fn from_rows<I, K>(rows: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<f32>)>,
        K: Into<String>,
    {
        rows.into_iter().collect()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.features.clear();
    }

    /// Iterates over `(key, vector)` pairs in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Array2<f32>)> {
        self.features
            .iter()
            .map(|(key, features)| (key.as_str(), features))
    }
}

impl<R: EntityRole> Default for FeatureSet<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: EntityRole> FeatureStore for FeatureSet<R> {
    fn role(&self) -> &'static str {
        R::NAME
    }

    fn get(&self, key: &str) -> Result<&Array2<f32>> {
        self.features
            .get(key)
            .ok_or_else(|| DrugPairError::KeyNotFound {
                role: R::NAME,
                key: key.to_string(),
            })
    }

    fn set<K, V>(&mut self, key: K, features: V) -> Option<Array2<f32>>
    where
        K: Into<String>,
        V: IntoFeatureRow,
    {
        self.features
            .insert(key.into(), features.into_feature_row())
    }

    fn delete(&mut self, key: &str) -> Result<Array2<f32>> {
        self.features
            .remove(key)
            .ok_or_else(|| DrugPairError::KeyNotFound {
                role: R::NAME,
                key: key.to_string(),
            })
    }

    fn contains(&self, key: &str) -> bool {
        self.features.contains_key(key)
    }

    fn len(&self) -> usize {
        self.features.len()
    }

    fn items(&self) -> Vec<(&str, &Array2<f32>)> {
        self.iter().collect()
    }
}

impl<R: EntityRole> fmt::Debug for FeatureSet<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureSet")
            .field("role", &R::NAME)
            .field("len", &self.features.len())
            .field("features", &self.features)
            .finish()
    }
}

impl<R, K, V> FromIterator<(K, V)> for FeatureSet<R>
where
    R: EntityRole,
    K: Into<String>,
    V: IntoFeatureRow,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        set.update(iter);
        set
    }
}

impl<R, K, V> Extend<(K, V)> for FeatureSet<R>
where
    R: EntityRole,
    K: Into<String>,
    V: IntoFeatureRow,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.update(iter);
    }
}

impl<'a, R: EntityRole> IntoIterator for &'a FeatureSet<R> {
    type Item = (&'a String, &'a Array2<f32>);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Array2<f32>>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}
