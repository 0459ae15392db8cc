use exif::{In, Reader, Tag, Value};
use std::io::Cursor;
use tracing::trace;

/// The handful of EXIF fields the manifest cares about. Every field is
/// optional; images without EXIF simply yield the default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExifFields {
    pub date_time_original: Option<String>,
    pub date_time_digitized: Option<String>,
    pub date_time: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub lens_make: Option<String>,
    pub lens_model: Option<String>,
    pub orientation: Option<u32>,
}

impl ExifFields {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
            Ok(exif) => exif,
            Err(e) => {
                trace!(error = %e, "no readable EXIF");
                return Self::default();
            }
        };

        Self {
            date_time_original: ascii(&exif, Tag::DateTimeOriginal),
            date_time_digitized: ascii(&exif, Tag::DateTimeDigitized),
            date_time: ascii(&exif, Tag::DateTime),
            make: ascii(&exif, Tag::Make),
            model: ascii(&exif, Tag::Model),
            lens_make: ascii(&exif, Tag::LensMake),
            lens_model: ascii(&exif, Tag::LensModel),
            orientation: exif
                .get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0)),
        }
    }

    /// Capture timestamps in priority order.
    pub fn capture_times(&self) -> [Option<&str>; 3] {
        [
            self.date_time_original.as_deref(),
            self.date_time_digitized.as_deref(),
            self.date_time.as_deref(),
        ]
    }

    /// Orientations 5-8 are rotated by 90 degrees.
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self.orientation, Some(5..=8))
    }
}

fn ascii(exif: &exif::Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let Value::Ascii(ref values) = field.value else {
        return None;
    };
    let text = String::from_utf8_lossy(values.first()?)
        .trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_string();
    (!text.is_empty()).then_some(text)
}
