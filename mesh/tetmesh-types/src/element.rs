//! Element records: triangles, tetrahedra and pass-through types.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Geometric type of an element.
///
/// Type codes follow the unified format's numbering: `2` is a 3-node
/// triangle and `4` a 4-node tetrahedron. Any other code is carried as
/// [`ElementKind::Other`] so it can be written back, but it never takes part
/// in classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ElementKind {
    /// 3-node triangle (code 2).
    Triangle,
    /// 4-node tetrahedron (code 4).
    Tetrahedron,
    /// Any other type code, stored verbatim.
    Other(u32),
}

impl ElementKind {
    /// Type code used by the unified format for triangles.
    pub const TRIANGLE_CODE: u32 = 2;

    /// Type code used by the unified format for tetrahedra.
    pub const TETRAHEDRON_CODE: u32 = 4;

    /// Map a unified-format type code to a kind.
    ///
    /// # Example
    ///
    /// ```
    /// use tetmesh_types::ElementKind;
    ///
    /// assert_eq!(ElementKind::from_code(2), ElementKind::Triangle);
    /// assert_eq!(ElementKind::from_code(4), ElementKind::Tetrahedron);
    /// assert_eq!(ElementKind::from_code(15), ElementKind::Other(15));
    /// ```
    #[must_use]
    pub const fn from_code(code: u32) -> Self {
        match code {
            Self::TRIANGLE_CODE => Self::Triangle,
            Self::TETRAHEDRON_CODE => Self::Tetrahedron,
            other => Self::Other(other),
        }
    }

    /// The unified-format type code.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Triangle => Self::TRIANGLE_CODE,
            Self::Tetrahedron => Self::TETRAHEDRON_CODE,
            Self::Other(code) => code,
        }
    }

    /// Number of vertex references an element of this kind carries.
    ///
    /// `None` for [`ElementKind::Other`], whose arity is taken from the record.
    #[must_use]
    pub const fn vertex_count(self) -> Option<usize> {
        match self {
            Self::Triangle => Some(3),
            Self::Tetrahedron => Some(4),
            Self::Other(_) => None,
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Triangle => f.write_str("triangle"),
            Self::Tetrahedron => f.write_str("tetrahedron"),
            Self::Other(code) => write!(f, "type-{code}"),
        }
    }
}

/// Tags attached to an element.
///
/// The unified format stores integer tags (physical group, elementary
/// entity, ...). The split format's trailing columns are kept as the
/// original strings and written back untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ElementTags {
    /// Integer tags from the unified format.
    Numeric(Vec<i64>),
    /// Opaque tokens from the split format.
    Opaque(Vec<String>),
}

impl ElementTags {
    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(tags) => tags.len(),
            Self::Opaque(tags) => tags.len(),
        }
    }

    /// Whether there are no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Space-joined tag list with no trailing whitespace.
    ///
    /// # Example
    ///
    /// ```
    /// use tetmesh_types::ElementTags;
    ///
    /// assert_eq!(ElementTags::Numeric(vec![1, 7]).joined(), "1 7");
    /// assert_eq!(ElementTags::Opaque(vec!["-1".into()]).joined(), "-1");
    /// assert_eq!(ElementTags::default().joined(), "");
    /// ```
    #[must_use]
    pub fn joined(&self) -> String {
        match self {
            Self::Numeric(tags) => tags
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" "),
            Self::Opaque(tags) => tags.join(" "),
        }
    }
}

impl Default for ElementTags {
    fn default() -> Self {
        Self::Numeric(Vec::new())
    }
}

/// A mesh element referencing vertices by id.
///
/// `vertex_refs` are lookups into the owning mesh's vertex table, never
/// indices into it.
///
/// # Example
///
/// ```
/// use tetmesh_types::{Element, ElementKind, ElementTags};
///
/// let tet = Element::new(7, ElementKind::Tetrahedron, vec![10, 11, 12, 13])
///     .with_tags(ElementTags::Numeric(vec![1]));
/// assert_eq!(tet.kind.code(), 4);
/// assert_eq!(tet.tags.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Element {
    /// Element id. Rewritten by normalization.
    pub id: u64,
    /// Geometric type.
    pub kind: ElementKind,
    /// Format-specific tags.
    pub tags: ElementTags,
    /// Ordered vertex ids.
    pub vertex_refs: Vec<u64>,
}

impl Element {
    /// Create an element without tags.
    #[must_use]
    pub fn new(id: u64, kind: ElementKind, vertex_refs: Vec<u64>) -> Self {
        Self {
            id,
            kind,
            tags: ElementTags::default(),
            vertex_refs,
        }
    }

    /// Replace the element's tags.
    #[must_use]
    pub fn with_tags(mut self, tags: ElementTags) -> Self {
        self.tags = tags;
        self
    }

    /// Whether this is a triangle.
    #[inline]
    #[must_use]
    pub fn is_triangle(&self) -> bool {
        self.kind == ElementKind::Triangle
    }

    /// Whether this is a tetrahedron.
    #[inline]
    #[must_use]
    pub fn is_tetrahedron(&self) -> bool {
        self.kind == ElementKind::Tetrahedron
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_roundtrip_for_known_kinds() {
        for kind in [ElementKind::Triangle, ElementKind::Tetrahedron] {
            assert_eq!(ElementKind::from_code(kind.code()), kind);
        }
        assert_eq!(ElementKind::Other(1).code(), 1);
    }

    #[test]
    fn vertex_count_by_kind() {
        assert_eq!(ElementKind::Triangle.vertex_count(), Some(3));
        assert_eq!(ElementKind::Tetrahedron.vertex_count(), Some(4));
        assert_eq!(ElementKind::Other(15).vertex_count(), None);
    }

    #[test]
    fn opaque_tags_join_verbatim() {
        let tags = ElementTags::Opaque(vec!["1".into(), "0.5".into(), "abc".into()]);
        assert_eq!(tags.len(), 3);
        assert_eq!(tags.joined(), "1 0.5 abc");
    }

    #[test]
    fn kind_display() {
        assert_eq!(ElementKind::Triangle.to_string(), "triangle");
        assert_eq!(ElementKind::Other(9).to_string(), "type-9");
    }
}
