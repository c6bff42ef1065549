//! Portable pixmap (PPM) reading and writing.
//!
//! Both flavours are supported: P3 stores channels as ASCII decimal
//! numbers, P6 stores them as raw bytes. Decoding and encoding go through
//! the `image` crate's PNM codec; this module adds the RGB8-only contract
//! the renderer relies on.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ColorType, ImageEncoder, ImageFormat};
use thiserror::Error;

/// Errors that can occur while reading or writing pixmaps.
#[derive(Error, Debug)]
pub enum PpmError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported pixmap format: {0} (expected P3 or P6)")]
    UnsupportedFormat(String),

    #[error("Pixel buffer has {actual} bytes, expected {expected} for {width}x{height} RGB")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

pub type PpmResult<T> = Result<T, PpmError>;

/// Channel encoding of a pixmap file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PpmEncoding {
    /// P3: one decimal number per channel.
    #[default]
    Ascii,
    /// P6: one byte per channel.
    Binary,
}

impl PpmEncoding {
    pub fn magic(&self) -> &'static str {
        match self {
            PpmEncoding::Ascii => "P3",
            PpmEncoding::Binary => "P6",
        }
    }

    fn sample_encoding(&self) -> SampleEncoding {
        match self {
            PpmEncoding::Ascii => SampleEncoding::Ascii,
            PpmEncoding::Binary => SampleEncoding::Binary,
        }
    }
}

/// A decoded RGB8 raster, rows stored top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct Pixmap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub encoding: PpmEncoding,
}

/// Number of bytes an RGB8 raster of the given size occupies.
pub fn rgb_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

fn check_len(width: u32, height: u32, data: &[u8]) -> PpmResult<()> {
    let expected = rgb_len(width, height);
    if data.len() != expected {
        return Err(PpmError::SizeMismatch {
            width,
            height,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Decode a P3 or P6 pixmap held in memory.
pub fn decode_ppm(bytes: &[u8]) -> PpmResult<Pixmap> {
    let encoding = match bytes.get(..2) {
        Some(b"P3") => PpmEncoding::Ascii,
        Some(b"P6") => PpmEncoding::Binary,
        Some(other) => {
            return Err(PpmError::UnsupportedFormat(
                String::from_utf8_lossy(other).into_owned(),
            ))
        }
        None => return Err(PpmError::UnsupportedFormat("<empty>".to_string())),
    };

    let rgb = image::load_from_memory_with_format(bytes, ImageFormat::Pnm)?.to_rgb8();
    let (width, height) = rgb.dimensions();

    Ok(Pixmap {
        width,
        height,
        data: rgb.into_raw(),
        encoding,
    })
}

/// Read a P3 or P6 pixmap from disk.
pub fn read_ppm<P: AsRef<Path>>(path: P) -> PpmResult<Pixmap> {
    let bytes = std::fs::read(path.as_ref())?;
    let pixmap = decode_ppm(&bytes)?;

    log::debug!(
        "Read {} {}x{} pixmap from {}",
        pixmap.encoding.magic(),
        pixmap.width,
        pixmap.height,
        path.as_ref().display()
    );
    Ok(pixmap)
}

/// Encode an RGB8 raster (max value 255) to `writer`.
pub fn encode_ppm<W: Write>(
    writer: W,
    width: u32,
    height: u32,
    data: &[u8],
    encoding: PpmEncoding,
) -> PpmResult<()> {
    check_len(width, height, data)?;

    PnmEncoder::new(writer)
        .with_subtype(PnmSubtype::Pixmap(encoding.sample_encoding()))
        .write_image(data, width, height, ColorType::Rgb8)?;

    Ok(())
}

/// Write an RGB8 raster to `path`, creating or truncating the file.
pub fn write_ppm<P: AsRef<Path>>(
    path: P,
    width: u32,
    height: u32,
    data: &[u8],
    encoding: PpmEncoding,
) -> PpmResult<()> {
    check_len(width, height, data)?;

    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    encode_ppm(&mut writer, width, height, data, encoding)?;
    writer.flush()?;

    log::debug!(
        "Wrote {} {}x{} pixmap to {}",
        encoding.magic(),
        width,
        height,
        path.as_ref().display()
    );
    Ok(())
}
