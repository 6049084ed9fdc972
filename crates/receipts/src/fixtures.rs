//! Receipt images built in memory for tests.

use exif::experimental::Writer;
use exif::{Field, In, Tag, Value};
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub fn ascii(tag: Tag, text: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![text.as_bytes().to_vec()]),
    }
}

/// Degrees/minutes/seconds rationals for an unsigned decimal degree value.
pub fn dms(degrees: f64) -> Value {
    // Work in ten-thousandths of an arc second so the split is exact.
    let total = (degrees.abs() * 3600.0 * 10_000.0).round() as u64;
    let d = total / 36_000_000;
    let m = (total % 36_000_000) / 600_000;
    let s = total % 600_000;
    Value::Rational(vec![(d as u32, 1).into(), (m as u32, 1).into(), (s as u32, 10_000).into()])
}

pub fn gps_fields(latitude: f64, longitude: f64) -> Vec<Field> {
    vec![
        Field { tag: Tag::GPSLatitude, ifd_num: In::PRIMARY, value: dms(latitude) },
        ascii(Tag::GPSLatitudeRef, if latitude < 0.0 { "S" } else { "N" }),
        Field { tag: Tag::GPSLongitude, ifd_num: In::PRIMARY, value: dms(longitude) },
        ascii(Tag::GPSLongitudeRef, if longitude < 0.0 { "W" } else { "E" }),
    ]
}

/// A minimal JPEG stream: SOI, one APP1 Exif segment, EOI.
pub fn jpeg_bytes(fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();
    let tiff = tiff.into_inner();

    let segment_len = u16::try_from(2 + 6 + tiff.len()).unwrap();
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

pub fn write_jpeg(dir: &Path, name: &str, fields: &[Field]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, jpeg_bytes(fields)).unwrap();
    path
}

/// A tiny PNG with no metadata at all.
pub fn write_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let img: image::RgbImage = image::ImageBuffer::from_fn(4, 4, |_, _| image::Rgb([200u8, 200, 200]));
    img.save_with_format(&path, image::ImageFormat::Png).unwrap();
    path
}
