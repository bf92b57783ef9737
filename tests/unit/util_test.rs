//! Tests for utility functions and image helpers

use emote_batch::infra::image::{self, DecodedImage, EMOTE_SIZE};
use emote_batch::infra::store::{sanitize_file_name, ArtifactStore, FsStore};
use emote_batch::util::init_tracing;

#[test]
fn test_init_tracing_twice() {
    init_tracing();
    init_tracing();
}

#[test]
fn test_data_uri_sniffs_gif_magic() {
    assert!(image::data_uri(b"GIF89a....").starts_with("data:image/gif;base64,"));
    assert!(image::data_uri(b"\x89PNG\r\n").starts_with("data:image/png;base64,"));
    assert_eq!(image::extension_for(b"GIF"), "png");
}

#[test]
fn test_still_image_renditions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tall.png");
    let img = ::image::RgbaImage::from_pixel(10, 40, ::image::Rgba([0, 255, 0, 255]));
    img.save(&path).unwrap();

    let decoded = image::load(&path).unwrap();
    assert_eq!(decoded.dimensions(), (10, 40));

    let small = decoded.to_square(EMOTE_SIZE);
    assert_eq!(small.dimensions(), (EMOTE_SIZE, EMOTE_SIZE));
    assert!(matches!(small, DecodedImage::Still(_)));
    assert_eq!(image::extension_for(&small.encode().unwrap()), "png");
}

#[test]
fn test_store_sanitizes_names() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path());

    let path = store.put("../escape.json", b"{}").unwrap();

    assert_eq!(path.parent(), Some(dir.path()));
    assert_eq!(sanitize_file_name("../escape.json"), "_escape.json");
}
