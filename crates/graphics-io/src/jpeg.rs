use crate::error::IoError;
use graphics_image::{Image, ImageSize};
use jpeg_encoder::{ColorType, Encoder};
use zune_jpeg::errors::DecodeErrors;
use zune_jpeg::zune_core::{colorspace::ColorSpace, options::DecoderOptions};
use zune_jpeg::JpegDecoder;

/// Quality used when the caller does not pick one, matching the usual libjpeg default.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Decodes a JPEG image with three channel (rgb8) from raw bytes.
///
/// Grayscale and CMYK sources are converted to RGB. The decoder runs in strict
/// mode, and streams that stop before the end of image marker are rejected with
/// [`IoError::JpegTruncated`] instead of being padded by the decoder.
///
/// # Arguments
///
/// - `src` - Raw bytes of the jpeg file
///
/// # Returns
///
/// A RGB image with the dimensions declared by the JPEG header.
pub fn decode_image_jpeg_rgb8(src: &[u8]) -> Result<Image<u8, 3>, IoError> {
    if src.starts_with(&[0xFF, 0xD8]) && end_of_image(src).is_none() {
        return Err(IoError::JpegTruncated);
    }

    let options = DecoderOptions::default()
        .jpeg_set_out_colorspace(ColorSpace::RGB)
        .set_strict_mode(true);

    let mut decoder = JpegDecoder::new_with_options(src, options);
    decoder.decode_headers()?;

    let image_info = decoder.info().ok_or_else(|| {
        IoError::JpegDecodingError(DecodeErrors::Format(String::from(
            "Failed to find image info from its metadata",
        )))
    })?;

    let image_size = ImageSize {
        width: image_info.width as usize,
        height: image_info.height as usize,
    };

    let img_data = decoder.decode()?;
    let img_data = expand_to_rgb(img_data, image_size.num_pixels());

    log::trace!("decoded jpeg of size {image_size}");

    Ok(Image::new(image_size, img_data)?)
}

// Offset just past the EOI marker, walking marker segments and skipping entropy
// coded data. None when the stream runs out first.
fn end_of_image(src: &[u8]) -> Option<usize> {
    let mut pos = 2;
    loop {
        if *src.get(pos)? != 0xFF {
            return None;
        }
        // fill bytes
        while *src.get(pos)? == 0xFF {
            pos += 1;
        }
        let marker = *src.get(pos)?;
        pos += 1;

        match marker {
            // EOI
            0xD9 => return Some(pos),
            // RSTn and TEM carry no payload
            0xD0..=0xD7 | 0x01 => {}
            _ => {
                let len = u16::from_be_bytes([*src.get(pos)?, *src.get(pos + 1)?]) as usize;
                if len < 2 {
                    return None;
                }
                pos += len;
                // SOS: the segment is followed by the scan data
                if marker == 0xDA {
                    pos = skip_scan_data(src, pos)?;
                }
            }
        }
    }
}

// Offset of the first marker after a scan. 0xFF00 is a stuffed byte and RSTn
// markers stay inside the scan.
fn skip_scan_data(src: &[u8], mut pos: usize) -> Option<usize> {
    loop {
        pos += src.get(pos..)?.iter().position(|&b| b == 0xFF)?;
        match *src.get(pos + 1)? {
            0x00 | 0xD0..=0xD7 => pos += 2,
            _ => return Some(pos),
        }
    }
}

// the decoder may hand back luma or rgba buffers depending on the source colorspace
fn expand_to_rgb(data: Vec<u8>, num_pixels: usize) -> Vec<u8> {
    match data.len() {
        n if n == num_pixels * 3 => data,
        n if n == num_pixels => data.iter().flat_map(|&v| [v, v, v]).collect(),
        n if n == num_pixels * 4 => data
            .chunks_exact(4)
            .flat_map(|p| [p[0], p[1], p[2]])
            .collect(),
        _ => data,
    }
}

/// Encodes the given _(rgb8)_ image as a baseline JPEG.
///
/// The encoder is deterministic: the same image and quality always produce the same bytes.
///
/// # Arguments
///
/// - `image` - The image to encode.
/// - `quality` - The quality of the JPEG encoding, clamped to 1 (lowest) ..= 100 (highest).
pub fn encode_image_jpeg_rgb8(image: &Image<u8, 3>, quality: u8) -> Result<Vec<u8>, IoError> {
    let image_size = image.size();
    let (Ok(width), Ok(height)) = (
        u16::try_from(image_size.width),
        u16::try_from(image_size.height),
    ) else {
        return Err(IoError::ImageTooLarge(image_size.width, image_size.height));
    };

    let mut buffer = Vec::with_capacity(image_size.num_pixels());
    let encoder = Encoder::new(&mut buffer, quality.clamp(1, 100));
    encoder.encode(image.as_slice(), width, height, ColorType::Rgb)?;

    Ok(buffer)
}
