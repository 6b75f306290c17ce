use anyhow::Result;
use test_log::test;

use traitcodec::{
    batch::{encode_directory, render_traits},
    decode_image,
    image::{save_png, RgbaImage},
    persist::{load_collection, save_collection},
    raster::rasterize,
    render::{isolated_layer, CANVAS_SIZE, SCALE},
    svg::to_svg,
    CodecError, Pixel, PixelSource, TraitCollection,
};

// 6x5 sprite with a transparent hole in the middle and a transparent border row.
fn sprite() -> RgbaImage {
    let red = Pixel::opaque(0xff, 0, 0);
    let green = Pixel::opaque(0, 0x80, 0);
    RgbaImage::from_fn(6, 5, |x, y| match (x, y) {
        (_, 0) => Pixel::TRANSPARENT,
        (2..=3, 2) => Pixel::TRANSPARENT,
        (0, _) | (5, _) => green,
        _ => red,
    })
}

#[test]
fn encode_persist_render_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let src = dir.path().join("src");
    save_png(&src.join("body-sprite.png"), &sprite())?;
    save_png(&src.join("body-empty.png"), &RgbaImage::new(4, 4))?;

    let mut collection = TraitCollection::default();
    let report = encode_directory(&src, &mut collection.palette)?;
    assert!(report.skipped.is_empty());
    assert_eq!(report.new_colors, ["008000", "ff0000"]);
    collection.merge_traits("bodies", report.traits);
    collection.bgcolors.push("d5d7e1".into());

    let path = dir.path().join("traits.json");
    save_collection(&path, &collection)?;
    let collection = load_collection(&path)?;

    let t = collection
        .find_trait("bodies", "body-sprite")
        .expect("encoded trait");
    let decoded = decode_image(&t.data)?;
    assert_eq!(
        (decoded.bounds.top, decoded.bounds.right, decoded.bounds.bottom, decoded.bounds.left),
        (1, 6, 4, 0)
    );

    // At CANVAS_SIZE / SCALE each source pixel lands on exactly one output pixel.
    let size = CANVAS_SIZE / SCALE;
    let out = rasterize(&isolated_layer(&t.data, &collection.palette)?, size);
    let original = sprite();
    for y in 0..size {
        for x in 0..size {
            let expected = if x < original.width() && y < original.height() {
                original.pixel_at(x, y)
            } else {
                Pixel::TRANSPARENT
            };
            assert_eq!(out.pixel_at(x, y), expected, "pixel ({}, {})", x, y);
        }
    }
    Ok(())
}

#[test]
fn transparent_image_renders_nothing() -> Result<()> {
    let dir = tempfile::tempdir()?;
    save_png(&dir.path().join("blank.png"), &RgbaImage::new(4, 4))?;

    let mut collection = TraitCollection::default();
    let report = encode_directory(dir.path(), &mut collection.palette)?;
    let data = &report.traits[0].data;
    assert!(decode_image(data)?.runs.is_empty());
    assert!(decode_image(data)?.bounds.is_empty());

    let image = isolated_layer(data, &collection.palette)?;
    assert!(image.primitives.is_empty());
    assert_eq!(collection.palette.len(), 1);
    Ok(())
}

#[test]
fn composite_layers_later_wins() -> Result<()> {
    let dir = tempfile::tempdir()?;
    save_png(
        &dir.path().join("a-base.png"),
        &RgbaImage::from_fn(2, 2, |_, _| Pixel::opaque(0, 0, 0xff)),
    )?;
    save_png(
        &dir.path().join("b-dot.png"),
        &RgbaImage::from_fn(2, 2, |x, y| {
            if (x, y) == (1, 1) {
                Pixel::opaque(0xff, 0xff, 0)
            } else {
                Pixel::TRANSPARENT
            }
        }),
    )?;

    let mut collection = TraitCollection::default();
    let report = encode_directory(dir.path(), &mut collection.palette)?;
    collection.merge_traits("layers", report.traits);

    let selection = [
        ("layers".to_string(), "a-base".to_string()),
        ("layers".to_string(), "b-dot".to_string()),
    ];
    let image = render_traits(&collection, &selection, 0xd5d7e1)?;
    let svg = to_svg(&image);
    assert!(svg.contains("fill=\"#d5d7e1\""));
    assert!(svg.contains("fill=\"#ffff00\""));

    let out = rasterize(&image, 32);
    assert_eq!(out.pixel_at(0, 0), Pixel::opaque(0, 0, 0xff));
    assert_eq!(out.pixel_at(1, 1), Pixel::opaque(0xff, 0xff, 0));
    assert_eq!(out.pixel_at(5, 5), Pixel::opaque(0xd5, 0xd7, 0xe1));
    Ok(())
}

#[test]
fn odd_run_section_is_malformed() {
    let err = decode_image("0x00000201000401f").unwrap_err();
    assert!(matches!(err, CodecError::MalformedEncoding(_)));
}
