//! Y4M frame source

use crate::error::{Error, Result};
use crate::format::VideoSource;
use crate::util::{ChromaSubsampling, ColorConverter, ColorRange};
use image::RgbImage;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};
use y4m::Decoder;

/// Y4M source decoding YUV4MPEG2 files to RGB frames
pub struct Y4mSource {
    decoder: Decoder<BufReader<File>>,
    width: usize,
    height: usize,
    subsampling: Option<ChromaSubsampling>,
    converter: ColorConverter,
    frame_count: usize,
    frame_number: usize,
}

impl Y4mSource {
    /// Open a Y4M file
    ///
    /// The whole file is scanned once to count its frames, since the Y4M
    /// header carries no frame count.
    pub fn open(path: &Path) -> Result<Self> {
        let decoder = Self::open_decoder(path)?;

        if decoder.get_bytes_per_sample() != 1 {
            return Err(Error::unsupported(format!(
                "{}-byte Y4M samples",
                decoder.get_bytes_per_sample()
            )));
        }

        let width = decoder.get_width();
        let height = decoder.get_height();
        let subsampling = Self::colorspace_to_subsampling(decoder.get_colorspace())?;
        let range = color_range(decoder.get_raw_params());
        let frame_count = Self::count_frames(path)?;

        debug!(
            "opened y4m {}: {}x{}, {:?} {:?} range, {} frames",
            path.display(),
            width,
            height,
            decoder.get_colorspace(),
            range,
            frame_count
        );

        Ok(Y4mSource {
            decoder,
            width,
            height,
            subsampling,
            converter: ColorConverter::new(range),
            frame_count,
            frame_number: 0,
        })
    }

    fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>> {
        let file = File::open(path)
            .map_err(|e| Error::source_open(format!("{}: {}", path.display(), e)))?;

        y4m::decode(BufReader::new(file)).map_err(|e| {
            Error::source_open(format!("{}: invalid Y4M header: {:?}", path.display(), e))
        })
    }

    /// Count complete frames; a truncated trailing frame ends the count
    fn count_frames(path: &Path) -> Result<usize> {
        let mut decoder = Self::open_decoder(path)?;
        let mut count = 0;

        loop {
            match decoder.read_frame() {
                Ok(_) => count += 1,
                Err(y4m::Error::EOF) => break,
                Err(e) => {
                    warn!("y4m frame {} unreadable, ignoring the rest: {:?}", count, e);
                    break;
                }
            }
        }

        Ok(count)
    }

    /// Map a y4m colorspace to its chroma layout; `None` for mono
    fn colorspace_to_subsampling(colorspace: y4m::Colorspace) -> Result<Option<ChromaSubsampling>> {
        match colorspace {
            y4m::Colorspace::C420
            | y4m::Colorspace::C420jpeg
            | y4m::Colorspace::C420paldv
            | y4m::Colorspace::C420mpeg2 => Ok(Some(ChromaSubsampling::YUV420)),
            y4m::Colorspace::C422 => Ok(Some(ChromaSubsampling::YUV422)),
            y4m::Colorspace::C444 => Ok(Some(ChromaSubsampling::YUV444)),
            y4m::Colorspace::Cmono => Ok(None),
            other => Err(Error::unsupported(format!("Y4M colorspace {:?}", other))),
        }
    }
}

/// Sample range from the `XCOLORRANGE` header extension, limited if absent
fn color_range(raw_params: &[u8]) -> ColorRange {
    let full = raw_params
        .split(|b| b.is_ascii_whitespace())
        .any(|param| param.eq_ignore_ascii_case(b"XCOLORRANGE=FULL"));
    if full {
        ColorRange::Full
    } else {
        ColorRange::Limited
    }
}

impl VideoSource for Y4mSource {
    fn format_name(&self) -> &str {
        "y4m"
    }

    fn frame_count(&self) -> usize {
        self.frame_count
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    fn read_frame(&mut self) -> Result<Option<RgbImage>> {
        let frame = match self.decoder.read_frame() {
            Ok(frame) => frame,
            Err(y4m::Error::EOF) => return Ok(None),
            Err(e) => {
                return Err(Error::format(format!(
                    "failed to read y4m frame {}: {:?}",
                    self.frame_number, e
                )))
            }
        };

        let chroma = self
            .subsampling
            .map(|_| (frame.get_u_plane(), frame.get_v_plane()));

        let rgb = self.converter.yuv_planes_to_rgb(
            frame.get_y_plane(),
            chroma,
            self.subsampling.unwrap_or(ChromaSubsampling::YUV444),
            self.width,
            self.height,
        )?;

        self.frame_number += 1;
        Ok(Some(rgb))
    }
}
