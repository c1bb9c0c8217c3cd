//! Single-record codecs for both formats.
//!
//! Each format writes one vertex or one element per line. [`RecordCodec`]
//! turns such a line into a model record and back, dispatching on
//! [`MeshFormat`]:
//!
//! ```text
//! unified vertex    id x y z
//! unified element   id type tag_count tag... node...
//! split vertex      id x y z [attribute... marker]
//! split face        id n1 n2 n3 [tag...]
//! split tetrahedron id n1 n2 n3 n4 [tag...]
//! ```
//!
//! Coordinates are always written as `{:.16e}` with a signed, at least
//! two-digit exponent (`1.0000000000000000e+00`), which reads back
//! bit-for-bit.

use std::fmt::Display;
use std::str::FromStr;

use tetmesh_types::{Element, ElementKind, ElementTags, MeshFormat, PhysicalName, Vertex};

use crate::error::{IoError, IoResult};

/// Number of vertex references per split-format element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodesPerElement {
    /// Triangular faces (`.face`).
    Three,
    /// Linear tetrahedra (`.ele`).
    Four,
}

impl NodesPerElement {
    /// Number of vertex references.
    #[must_use]
    pub const fn count(self) -> usize {
        match self {
            Self::Three => 3,
            Self::Four => 4,
        }
    }

    /// Element kind produced for this arity.
    #[must_use]
    pub const fn kind(self) -> ElementKind {
        match self {
            Self::Three => ElementKind::Triangle,
            Self::Four => ElementKind::Tetrahedron,
        }
    }
}

impl TryFrom<usize> for NodesPerElement {
    type Error = IoError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            other => Err(IoError::MissingConfig {
                message: format!("nodes_per_element must be 3 or 4, got {other}"),
            }),
        }
    }
}

/// Decoder settings for element records.
///
/// The unified format carries the element type in every record and ignores
/// this. The split format does not, so decoding a split element requires
/// `nodes_per_element`.
///
/// # Example
///
/// ```
/// use tetmesh_io::{ElementConfig, MeshFormat, RecordCodec};
///
/// let tet = MeshFormat::Split
///     .decode_element("1  4 7 9 2", &ElementConfig::tetrahedra())
///     .unwrap();
/// assert_eq!(tet.vertex_refs, vec![4, 7, 9, 2]);
///
/// assert!(MeshFormat::Split
///     .decode_element("1  4 7 9 2", &ElementConfig::default())
///     .is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementConfig {
    /// Vertex references per record. Required by the split format.
    pub nodes_per_element: Option<NodesPerElement>,
}

impl ElementConfig {
    /// Config for `.face` records.
    #[must_use]
    pub const fn triangles() -> Self {
        Self {
            nodes_per_element: Some(NodesPerElement::Three),
        }
    }

    /// Config for `.ele` records.
    #[must_use]
    pub const fn tetrahedra() -> Self {
        Self {
            nodes_per_element: Some(NodesPerElement::Four),
        }
    }

    /// Build a config from a raw arity, rejecting anything but 3 or 4.
    ///
    /// # Errors
    ///
    /// [`IoError::MissingConfig`] for unsupported arities.
    pub fn with_nodes_per_element(count: usize) -> IoResult<Self> {
        Ok(Self {
            nodes_per_element: Some(NodesPerElement::try_from(count)?),
        })
    }
}

/// Line-level encoding and decoding of vertex and element records.
pub trait RecordCodec {
    /// Decode one vertex line.
    ///
    /// # Errors
    ///
    /// [`IoError::MalformedRecord`] if the line has the wrong field count or
    /// a field fails to parse.
    fn decode_vertex(&self, line: &str) -> IoResult<Vertex>;

    /// Decode one element line.
    ///
    /// # Errors
    ///
    /// - [`IoError::MalformedRecord`] for bad field counts or values.
    /// - [`IoError::MissingConfig`] when the format needs
    ///   `config.nodes_per_element` and it is unset.
    fn decode_element(&self, line: &str, config: &ElementConfig) -> IoResult<Element>;

    /// Encode one vertex, multiplying coordinates by `scale`. No newline.
    fn encode_vertex(&self, vertex: &Vertex, scale: f64) -> String;

    /// Encode one element. No newline.
    fn encode_element(&self, element: &Element) -> String;
}

impl RecordCodec for MeshFormat {
    fn decode_vertex(&self, line: &str) -> IoResult<Vertex> {
        let mut fields = data_fields(*self, line);
        let id = parse_field(fields.next(), "vertex id")?;
        let x = parse_field(fields.next(), "x coordinate")?;
        let y = parse_field(fields.next(), "y coordinate")?;
        let z = parse_field(fields.next(), "z coordinate")?;

        match self {
            Self::Unified => {
                if let Some(extra) = fields.next() {
                    return Err(IoError::malformed(format!(
                        "unexpected field `{extra}` after vertex coordinates"
                    )));
                }
                Ok(Vertex::from_coords(id, x, y, z))
            }
            Self::Split => {
                let tags = fields
                    .map(|token| parse_field(Some(token), "vertex attribute"))
                    .collect::<IoResult<Vec<f64>>>()?;
                Ok(Vertex::from_coords(id, x, y, z).with_tags(tags))
            }
        }
    }

    fn decode_element(&self, line: &str, config: &ElementConfig) -> IoResult<Element> {
        match self {
            Self::Unified => decode_unified_element(line),
            Self::Split => {
                let arity = config.nodes_per_element.ok_or_else(|| IoError::MissingConfig {
                    message: "split elements need nodes_per_element (3 for faces, 4 for tetrahedra)"
                        .to_string(),
                })?;
                decode_split_element(line, arity)
            }
        }
    }

    fn encode_vertex(&self, vertex: &Vertex, scale: f64) -> String {
        let p = vertex.position;
        let coords = format!(
            "{} {} {}",
            format_scientific(p.x * scale),
            format_scientific(p.y * scale),
            format_scientific(p.z * scale)
        );
        match self {
            Self::Unified => format!("{} {coords}", vertex.id),
            Self::Split => format!("{:>5} {coords}", vertex.id),
        }
    }

    fn encode_element(&self, element: &Element) -> String {
        match self {
            Self::Unified => {
                let refs = element
                    .vertex_refs
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                format!(
                    "{} {} {} {} {}",
                    element.id,
                    element.kind.code(),
                    element.tags.len(),
                    element.tags.joined(),
                    refs
                )
            }
            Self::Split => {
                let refs: String = element
                    .vertex_refs
                    .iter()
                    .map(|r| format!("{r:>6}"))
                    .collect();
                let gap = if element.is_tetrahedron() { "  " } else { " " };
                format!("{:>5}{gap}{refs} {}", element.id, element.tags.joined())
            }
        }
    }
}

/// Whitespace fields of a data line. Split-format lines may end in a `#` comment.
fn data_fields(format: MeshFormat, line: &str) -> std::str::SplitWhitespace<'_> {
    let data = match format {
        MeshFormat::Unified => line,
        MeshFormat::Split => line.split_once('#').map_or(line, |(data, _)| data),
    };
    data.split_whitespace()
}

fn decode_unified_element(line: &str) -> IoResult<Element> {
    let mut fields = line.split_whitespace();
    let id = parse_field(fields.next(), "element id")?;
    let code: u32 = parse_field(fields.next(), "element type")?;
    let tag_count: usize = parse_field(fields.next(), "tag count")?;

    let tags = (0..tag_count)
        .map(|_| parse_field(fields.next(), "element tag"))
        .collect::<IoResult<Vec<i64>>>()?;
    let vertex_refs = fields
        .map(|token| parse_field(Some(token), "node reference"))
        .collect::<IoResult<Vec<u64>>>()?;

    let kind = ElementKind::from_code(code);
    match kind.vertex_count() {
        Some(expected) if expected != vertex_refs.len() => {
            return Err(IoError::malformed(format!(
                "{kind} {id} has {} node references, expected {expected}",
                vertex_refs.len()
            )));
        }
        None if vertex_refs.is_empty() => {
            return Err(IoError::malformed(format!(
                "element {id} has no node references"
            )));
        }
        _ => {}
    }

    Ok(Element::new(id, kind, vertex_refs).with_tags(ElementTags::Numeric(tags)))
}

fn decode_split_element(line: &str, arity: NodesPerElement) -> IoResult<Element> {
    let mut fields = data_fields(MeshFormat::Split, line);
    let id = parse_field(fields.next(), "element id")?;
    let vertex_refs = (0..arity.count())
        .map(|_| parse_field(fields.next(), "node reference"))
        .collect::<IoResult<Vec<u64>>>()?;
    let tags = fields.map(str::to_string).collect();

    Ok(Element::new(id, arity.kind(), vertex_refs).with_tags(ElementTags::Opaque(tags)))
}

/// Decode a `$PhysicalNames` record: `dimension id name`.
///
/// Everything after the id is the name, so quoted names with spaces survive.
///
/// # Errors
///
/// [`IoError::MalformedRecord`] if a field is missing or not numeric.
pub fn decode_physical_name(line: &str) -> IoResult<PhysicalName> {
    let (dimension, rest) = split_token(line);
    let (id, rest) = split_token(rest);
    let name = rest.trim();
    if name.is_empty() {
        return Err(IoError::malformed("physical name record has no name"));
    }
    Ok(PhysicalName {
        dimension: parse_field(dimension, "physical dimension")?,
        id: parse_field(id, "physical id")?,
        name: name.to_string(),
    })
}

/// Encode a `$PhysicalNames` record.
#[must_use]
pub fn encode_physical_name(name: &PhysicalName) -> String {
    format!("{} {} {}", name.dimension, name.id, name.name)
}

fn split_token(s: &str) -> (Option<&str>, &str) {
    let s = s.trim_start();
    if s.is_empty() {
        return (None, s);
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    (Some(&s[..end]), &s[end..])
}

fn parse_field<T>(token: Option<&str>, field: &str) -> IoResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    let token = token.ok_or_else(|| IoError::malformed(format!("missing {field}")))?;
    token
        .parse()
        .map_err(|e| IoError::malformed(format!("invalid {field} `{token}`: {e}")))
}

/// Format a float in scientific notation with 16 fractional digits and a
/// signed exponent of at least two digits.
///
/// # Example
///
/// ```
/// use tetmesh_io::format_scientific;
///
/// assert_eq!(format_scientific(1.0), "1.0000000000000000e+00");
/// assert_eq!(format_scientific(-2.5e-7), "-2.5000000000000000e-07");
/// assert_eq!(format_scientific(0.0), "0.0000000000000000e+00");
/// ```
#[must_use]
pub fn format_scientific(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let raw = format!("{value:.16e}");
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    match exponent.parse::<i32>() {
        Ok(exp) => {
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
        }
        Err(_) => raw,
    }
}
