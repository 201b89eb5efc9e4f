//! Property-based tests for archive extraction
//!
//! Whatever the member names and link targets, nothing may be written
//! outside the extraction directory.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::*;
use galaxy_importer_collection::{ArchiveExtractor, ExtractionFilter};
use galaxy_importer_core::Error;
use proptest::prelude::*;
use tempfile::TempDir;

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

fn relative_path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..4).prop_map(|parts| parts.join("/"))
}

fn filter() -> impl Strategy<Value = ExtractionFilter> {
    prop_oneof![Just(ExtractionFilter::Builtin), Just(ExtractionFilter::ManualOnly)]
}

fn extract(data: &[u8], filter: ExtractionFilter) -> (TempDir, galaxy_importer_core::Result<()>) {
    let outer = TempDir::new().expect("tempdir");
    let dest = outer.path().join("dest");
    std::fs::create_dir(&dest).expect("dest dir");
    let result = ArchiveExtractor::default()
        .with_filter(filter)
        .extract_from_reader(data, &dest)
        .map(|_| ());
    (outer, result)
}

proptest! {
    #[test]
    fn absolute_members_rejected(path in relative_path(), filter in filter()) {
        let data = ArchiveWriter::new()
            .raw_file(&format!("/{}", path), b"evil")
            .finish();
        let (_outer, result) = extract(&data, filter);
        prop_assert!(matches!(result, Err(Error::UnsafeArchiveMember { .. })), "expected UnsafeArchiveMember, got {:?}", result);
    }

    #[test]
    fn escaping_members_rejected(
        depth in 1usize..4,
        path in relative_path(),
        filter in filter(),
    ) {
        let name = format!("{}{}", "../".repeat(depth), path);
        let data = ArchiveWriter::new().raw_file(&name, b"evil").finish();
        let (outer, result) = extract(&data, filter);
        prop_assert!(matches!(result, Err(Error::UnsafeArchiveMember { .. })), "expected UnsafeArchiveMember, got {:?}", result);
        prop_assert!(!outer.path().join(&path).exists());
    }

    #[test]
    fn symlink_to_root_rejected(name in segment(), filter in filter()) {
        let data = ArchiveWriter::new().symlink(&name, "/").finish();
        let (_outer, result) = extract(&data, filter);
        prop_assert!(matches!(result, Err(Error::UnsafeArchiveMember { .. })), "expected UnsafeArchiveMember, got {:?}", result);
    }

    #[test]
    fn symlink_above_root_rejected(
        dir in segment(),
        name in segment(),
        extra in 1usize..3,
        filter in filter(),
    ) {
        let target = "../".repeat(1 + extra);
        let data = ArchiveWriter::new()
            .dir(&dir)
            .symlink(&format!("{}/{}", dir, name), &target)
            .finish();
        let (_outer, result) = extract(&data, filter);
        prop_assert!(matches!(result, Err(Error::UnsafeArchiveMember { .. })), "expected UnsafeArchiveMember, got {:?}", result);
    }

    #[test]
    fn in_tree_members_extracted(path in relative_path(), filter in filter()) {
        let data = ArchiveWriter::new().file(&path, b"content").finish();
        let (outer, result) = extract(&data, filter);
        prop_assert!(result.is_ok());
        let written = std::fs::read(outer.path().join("dest").join(&path)).expect("extracted file");
        prop_assert_eq!(written, b"content".to_vec());
    }

    #[test]
    fn in_tree_symlinks_extracted(a in segment(), b in segment(), filter in filter()) {
        prop_assume!(a != b);
        let data = ArchiveWriter::new()
            .dir(&a)
            .dir(&b)
            .symlink(&format!("{}/link", b), &format!("../{}", a))
            .finish();
        let (_outer, result) = extract(&data, filter);
        prop_assert!(result.is_ok());
    }

    #[test]
    fn symlink_through_earlier_link_rejected(
        dir in segment(),
        hop in segment(),
        name in segment(),
        filter in filter(),
    ) {
        prop_assume!(dir != name);
        let data = ArchiveWriter::new()
            .dir(&dir)
            .symlink(&format!("{}/{}", dir, hop), "..")
            .symlink(&name, &format!("{}/{}/..", dir, hop))
            .finish();
        let (outer, result) = extract(&data, filter);
        prop_assert!(matches!(result, Err(Error::UnsafeArchiveMember { .. })), "expected UnsafeArchiveMember, got {:?}", result);
        prop_assert!(outer.path().join("dest").join(&name).symlink_metadata().is_err());
    }

    #[test]
    fn symlink_escaping_after_later_member_rejected(
        dir in segment(),
        hop in segment(),
        name in segment(),
        filter in filter(),
    ) {
        prop_assume!(dir != name);
        let data = ArchiveWriter::new()
            .dir(&dir)
            .symlink(&name, &format!("{}/{}/..", dir, hop))
            .symlink(&format!("{}/{}", dir, hop), "..")
            .finish();
        let (outer, result) = extract(&data, filter);
        prop_assert!(matches!(result, Err(Error::UnsafeArchiveMember { .. })), "expected UnsafeArchiveMember, got {:?}", result);
        prop_assert!(outer.path().join("dest").join(&name).symlink_metadata().is_err());
    }
}
