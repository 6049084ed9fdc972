use chrono::NaiveDateTime;
use exif::{Exif, In, Tag, Value};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use tally_core::{Coordinate, ReceiptMetadata};

/// EXIF timestamp layout, e.g. `2024:03:15 12:30:45`.
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Capture time candidates, most specific first.
const TIMESTAMP_TAGS: [Tag; 2] = [Tag::DateTimeOriginal, Tag::DateTime];

const DESCRIPTION_TAG: Tag = Tag::ImageDescription;

/// One GPS axis: the degrees/minutes/seconds tag and its hemisphere tag.
struct GpsAxis {
    value: Tag,
    reference: Tag,
    positive: u8,
    negative: u8,
}

const LATITUDE: GpsAxis = GpsAxis {
    value: Tag::GPSLatitude,
    reference: Tag::GPSLatitudeRef,
    positive: b'N',
    negative: b'S',
};

const LONGITUDE: GpsAxis = GpsAxis {
    value: Tag::GPSLongitude,
    reference: Tag::GPSLongitudeRef,
    positive: b'E',
    negative: b'W',
};

/// Read whatever location, time and description a receipt photo carries.
///
/// Never fails: a missing file, an image without EXIF, or a malformed tag all
/// leave the corresponding field unset.
pub fn extract(path: &Path) -> ReceiptMetadata {
    let mut metadata = ReceiptMetadata::empty(path);

    let exif = match read_exif(path) {
        Ok(exif) => exif,
        Err(e) => {
            tracing::debug!("No EXIF data in {}: {e}", path.display());
            return metadata;
        }
    };

    metadata.coordinate = read_coordinate(&exif);
    metadata.captured_at = read_timestamp(&exif);
    metadata.description = read_ascii(&exif, DESCRIPTION_TAG).filter(|d| !d.is_empty());
    metadata
}

/// Extraction bound to the permanent receipt folder.
///
/// Construction makes sure the folder exists so later moves have a target.
pub struct ReceiptExtractor {
    storage_dir: PathBuf,
}

impl ReceiptExtractor {
    pub fn new(storage_dir: PathBuf) -> io::Result<Self> {
        std::fs::create_dir_all(&storage_dir)?;
        Ok(Self { storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn extract(&self, path: &Path) -> ReceiptMetadata {
        extract(path)
    }
}

fn read_exif(path: &Path) -> Result<Exif, exif::Error> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    exif::Reader::new().read_from_container(&mut reader)
}

fn read_coordinate(exif: &Exif) -> Option<Coordinate> {
    let latitude = read_axis(exif, &LATITUDE)?;
    let longitude = read_axis(exif, &LONGITUDE)?;
    Some(Coordinate::new(latitude, longitude))
}

/// Signed decimal degrees for one axis, or `None` if any part is missing or
/// malformed.
fn read_axis(exif: &Exif, axis: &GpsAxis) -> Option<f64> {
    let field = exif.get_field(axis.value, In::PRIMARY)?;
    let Value::Rational(parts) = &field.value else {
        return None;
    };
    if parts.len() != 3 || parts.iter().any(|r| r.denom == 0) {
        return None;
    }

    let degrees = parts[0].to_f64() + parts[1].to_f64() / 60.0 + parts[2].to_f64() / 3600.0;

    let hemisphere = read_ascii(exif, axis.reference)?;
    match hemisphere.bytes().next().map(|b| b.to_ascii_uppercase()) {
        Some(b) if b == axis.positive => Some(degrees),
        Some(b) if b == axis.negative => Some(-degrees),
        _ => None,
    }
}

fn read_timestamp(exif: &Exif) -> Option<NaiveDateTime> {
    TIMESTAMP_TAGS.iter().find_map(|tag| {
        let raw = read_ascii(exif, *tag)?;
        NaiveDateTime::parse_from_str(&raw, EXIF_DATETIME_FORMAT).ok()
    })
}

/// First ASCII component of `tag`, trimmed of whitespace and NUL padding.
fn read_ascii(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(parts) => parts.first().map(|bytes| {
            String::from_utf8_lossy(bytes)
                .trim_matches(|c: char| c == '\0' || c.is_whitespace())
                .to_string()
        }),
        _ => None,
    }
}
