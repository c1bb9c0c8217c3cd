//! Property-based tests for record encoding.
//!
//! Run with: cargo test -p tetmesh-io -- proptest

use proptest::prelude::*;
use tetmesh_io::{
    Element, ElementConfig, ElementKind, ElementTags, MeshFormat, RecordCodec, Vertex,
    format_scientific,
};

fn arb_finite() -> impl Strategy<Value = f64> {
    prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO
}

fn arb_format() -> impl Strategy<Value = MeshFormat> {
    prop_oneof![Just(MeshFormat::Unified), Just(MeshFormat::Split)]
}

proptest! {
    #[test]
    fn proptest_scientific_is_bit_exact(value in arb_finite()) {
        let parsed: f64 = format_scientific(value).parse().unwrap_or(f64::NAN);
        prop_assert_eq!(parsed.to_bits(), value.to_bits());
    }

    #[test]
    fn proptest_vertex_line_keeps_position(
        format in arb_format(),
        id in 0u64..1_000_000,
        x in arb_finite(),
        y in arb_finite(),
        z in arb_finite(),
    ) {
        let vertex = Vertex::from_coords(id, x, y, z);
        let decoded = format.decode_vertex(&format.encode_vertex(&vertex, 1.0));
        prop_assert!(decoded.is_ok());
        if let Ok(decoded) = decoded {
            prop_assert_eq!(decoded.id, id);
            prop_assert_eq!(decoded.position.x.to_bits(), x.to_bits());
            prop_assert_eq!(decoded.position.y.to_bits(), y.to_bits());
            prop_assert_eq!(decoded.position.z.to_bits(), z.to_bits());
        }
    }

    #[test]
    fn proptest_tetrahedron_line_keeps_refs(
        format in arb_format(),
        id in 1u64..100_000,
        refs in prop::collection::vec(1u64..1_000_000, 4),
    ) {
        let tags = match format {
            MeshFormat::Unified => ElementTags::Numeric(vec![1, 1]),
            MeshFormat::Split => ElementTags::Opaque(Vec::new()),
        };
        let tet = Element::new(id, ElementKind::Tetrahedron, refs.clone()).with_tags(tags);
        let decoded = format.decode_element(&format.encode_element(&tet), &ElementConfig::tetrahedra());
        prop_assert!(decoded.is_ok());
        if let Ok(decoded) = decoded {
            prop_assert_eq!(decoded, tet);
        }
    }
}
