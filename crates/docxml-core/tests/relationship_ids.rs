//! Relationship identifier and lazy part tests

use std::collections::HashSet;

use docxml_core::parts::{BinaryPart, StylesXml};
use docxml_core::{IdAllocator, Part, RelationshipType, Relationships};
use proptest::prelude::*;

fn document_rels(seed: u64) -> Relationships {
    Relationships::with_allocator("word/document.xml", IdAllocator::seeded(seed))
}

#[test]
fn test_ensure_creates_one_part() {
    let mut rels = document_rels(1);
    let mut calls = 0;
    rels.ensure(|location| {
        calls += 1;
        StylesXml::new(location)
    })
    .unwrap();
    rels.ensure(|location| {
        calls += 1;
        StylesXml::new(location)
    })
    .unwrap();

    assert_eq!(calls, 1);
    assert_eq!(rels.len(), 1);
    let meta = rels.find_by_type(RelationshipType::Styles).unwrap();
    assert_eq!(meta.target, "word/styles.xml");
}

#[test]
fn test_same_media_is_stored_once() {
    let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3];
    let mut rels = document_rels(2);
    let first = rels.add_media(&png, "media");
    let second = rels.add_media(&png, "media");
    let other = rels.add_media(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 9], "media");

    assert_eq!(first, second);
    assert_ne!(first, other);
    assert_eq!(rels.len(), 2);
    assert_eq!(rels.binary_data(&first), Some(&png[..]));
    assert!(rels.meta(&first).unwrap().target.starts_with("word/media/"));
}

#[test]
fn test_targets_are_written_relative() {
    let mut rels = document_rels(3);
    rels.add_part(
        RelationshipType::Image,
        Part::Binary(BinaryPart::new("word/media/logo.png", "image/png", vec![1])),
    );
    rels.add_external(RelationshipType::Hyperlink, "https://example.com/a?b=1&c=2");

    let xml = rels.to_xml(true);
    assert!(xml.contains(r#"Target="media/logo.png""#));
    assert!(xml.contains(r#"Target="https://example.com/a?b=1&amp;c=2" TargetMode="External""#));
}

#[test]
fn test_external_links_are_shared() {
    let mut rels = document_rels(4);
    let a = rels.add_external(RelationshipType::Hyperlink, "https://example.com");
    let b = rels.add_external(RelationshipType::Hyperlink, "https://example.com");
    assert_eq!(a, b);
    assert_eq!(rels.len(), 1);
}

#[test]
fn test_seeded_allocators_repeat() {
    let mut a = document_rels(42);
    let mut b = document_rels(42);
    for _ in 0..5 {
        assert_eq!(
            a.add(RelationshipType::Theme, "theme/theme1.xml"),
            b.add(RelationshipType::Theme, "theme/theme1.xml")
        );
    }
}

#[test]
fn test_free_location_skips_taken_names() {
    let mut rels = document_rels(5);
    assert_eq!(rels.free_location("header", "xml"), "word/header1.xml");
    rels.add(RelationshipType::Header, "header1.xml");
    rels.add(RelationshipType::Header, "header2.xml");
    assert_eq!(rels.free_location("header", "xml"), "word/header3.xml");
}

proptest! {
    #[test]
    fn prop_ids_are_unique(seed in any::<u64>(), count in 1usize..64) {
        let mut rels = document_rels(seed);
        let mut seen = HashSet::new();
        for n in 0..count {
            let id = rels.add(RelationshipType::Image, &format!("media/image{n}.png"));
            prop_assert!(id.starts_with("rId"));
            prop_assert!(seen.insert(id));
        }
        prop_assert_eq!(rels.len(), count);
    }

    #[test]
    fn prop_ids_parse_back(seed in any::<u64>(), count in 1usize..16) {
        let mut rels = document_rels(seed);
        for n in 0..count {
            rels.add(RelationshipType::Footer, &format!("footer{n}.xml"));
        }
        let metas = Relationships::parse_metas("word/document.xml", rels.to_xml(false).as_bytes())
            .unwrap();
        prop_assert_eq!(metas.len(), count);
        for (parsed, original) in metas.iter().zip(rels.metas()) {
            prop_assert_eq!(parsed, original);
        }
    }
}
