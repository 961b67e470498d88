//! Unindexed facet mesh.

use crate::{Aabb, Facet, MeshBounds};
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordered sequence of facets.
///
/// This is the layout STL stores: every facet carries its own three vertex
/// positions, nothing is shared or indexed. Order carries no geometric
/// meaning but is kept stable so serialized output is reproducible.
///
/// # Example
///
/// ```
/// use mesh_types::{Axis, Facet, FacetMesh, MeshBounds, Point3};
///
/// let mesh = FacetMesh::from_facets(vec![Facet::without_normal(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(4.0, 0.0, 0.0),
///     Point3::new(0.0, 2.0, 1.0),
/// )]);
///
/// assert_eq!(mesh.peak_to_peak(Axis::X), Some(4.0));
/// assert_eq!(mesh.vertices().count(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FacetMesh {
    /// Facets in emission order.
    pub facets: Vec<Facet>,
}

impl FacetMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { facets: Vec::new() }
    }

    /// Create an empty mesh with room for `facet_count` facets.
    #[inline]
    #[must_use]
    pub fn with_capacity(facet_count: usize) -> Self {
        Self {
            facets: Vec::with_capacity(facet_count),
        }
    }

    /// Wrap an existing facet list.
    #[inline]
    #[must_use]
    pub const fn from_facets(facets: Vec<Facet>) -> Self {
        Self { facets }
    }

    /// Number of facets.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.facets.len()
    }

    /// True when the mesh has no facets.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Append one facet.
    #[inline]
    pub fn push(&mut self, facet: Facet) {
        self.facets.push(facet);
    }

    /// Iterate over the facets.
    pub fn iter(&self) -> std::slice::Iter<'_, Facet> {
        self.facets.iter()
    }

    /// Iterate mutably over the facets.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Facet> {
        self.facets.iter_mut()
    }

    /// Iterate over every vertex position of every facet.
    pub fn vertices(&self) -> impl Iterator<Item = &Point3<f64>> {
        self.facets.iter().flat_map(|f| f.vertices.iter())
    }

    /// Multiply every vertex coordinate of every facet by `factor`.
    pub fn scale_vertices(&mut self, factor: f64) {
        for facet in &mut self.facets {
            facet.scale_vertices(factor);
        }
    }
}

impl MeshBounds for FacetMesh {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices())
    }
}

impl Extend<Facet> for FacetMesh {
    fn extend<T: IntoIterator<Item = Facet>>(&mut self, iter: T) {
        self.facets.extend(iter);
    }
}

impl FromIterator<Facet> for FacetMesh {
    fn from_iter<T: IntoIterator<Item = Facet>>(iter: T) -> Self {
        Self {
            facets: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FacetMesh {
    type Item = &'a Facet;
    type IntoIter = std::slice::Iter<'a, Facet>;

    fn into_iter(self) -> Self::IntoIter {
        self.facets.iter()
    }
}
