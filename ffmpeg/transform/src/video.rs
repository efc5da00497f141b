/*!
    Video scaling and pixel format conversion.
*/

use ffmpeg_next::{format::Pixel, software::scaling, util::frame::video::Video as VideoFrameFFmpeg};
use log::debug;

use ffmpeg_types::{Error, PixelFormat, Result, VideoFrame};

/**
    Interpolation used when resizing frames.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScalingAlgorithm {
    /// Fast bilinear, lower quality.
    FastBilinear,
    /// Bilinear.
    Bilinear,
    /// Bicubic, a good default for both up and downscaling.
    #[default]
    Bicubic,
    /// Nearest neighbor.
    Point,
    /// Pixel area averaging, good for large downscales.
    Area,
    /// Lanczos, slowest and sharpest.
    Lanczos,
}

impl ScalingAlgorithm {
    fn flags(self) -> scaling::Flags {
        match self {
            Self::FastBilinear => scaling::Flags::FAST_BILINEAR,
            Self::Bilinear => scaling::Flags::BILINEAR,
            Self::Bicubic => scaling::Flags::BICUBIC,
            Self::Point => scaling::Flags::POINT,
            Self::Area => scaling::Flags::AREA,
            Self::Lanczos => scaling::Flags::LANCZOS,
        }
    }
}

/**
    Target of a video transformation.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoTransformConfig {
    /// Output pixel format.
    pub format: PixelFormat,
    /// Output width, or the input width if `None`.
    pub width: Option<u32>,
    /// Output height, or the input height if `None`.
    pub height: Option<u32>,
    /// Interpolation used when the size changes.
    pub algorithm: ScalingAlgorithm,
}

impl VideoTransformConfig {
    /**
        Convert to the given format, keeping the input size.
    */
    pub fn new(format: PixelFormat) -> Self {
        Self {
            format,
            width: None,
            height: None,
            algorithm: ScalingAlgorithm::default(),
        }
    }

    /**
        Convert to packed 24-bit RGB, keeping the input size.
    */
    pub fn to_rgb24() -> Self {
        Self::new(PixelFormat::Rgb24)
    }

    /**
        Convert to 8-bit grayscale, keeping the input size.
    */
    pub fn to_gray8() -> Self {
        Self::new(PixelFormat::Gray8)
    }

    /**
        Resize to the given dimensions.
    */
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /**
        Use the given interpolation.
    */
    pub fn with_algorithm(mut self, algorithm: ScalingAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /**
        Output dimensions for an input of the given size.
    */
    pub fn output_size(&self, width: u32, height: u32) -> (u32, u32) {
        (self.width.unwrap_or(width), self.height.unwrap_or(height))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ScalerKey {
    input: (PixelFormat, u32, u32),
    output: (PixelFormat, u32, u32),
    algorithm: ScalingAlgorithm,
}

struct Scaler {
    context: scaling::Context,
    key: ScalerKey,
}

impl Scaler {
    fn new(key: ScalerKey) -> Result<Self> {
        let (src_format, src_width, src_height) = key.input;
        let (dst_format, dst_width, dst_height) = key.output;

        let context = scaling::Context::get(
            to_ffmpeg_pixel(src_format)?,
            src_width,
            src_height,
            to_ffmpeg_pixel(dst_format)?,
            dst_width,
            dst_height,
            key.algorithm.flags(),
        )
        .map_err(|e| Error::codec(format!("scaler {key:?}: {e}")))?;

        debug!(
            "[video_transform] scaler {src_format:?} {src_width}x{src_height} -> \
             {dst_format:?} {dst_width}x{dst_height} ({:?})",
            key.algorithm
        );

        Ok(Self { context, key })
    }
}

/**
    Converts video frames to a configured format and size.
*/
pub struct VideoTransform {
    config: VideoTransformConfig,
    scaler: Option<Scaler>,
}

impl VideoTransform {
    /**
        Create a new transform. The scaler is created on the first frame.
    */
    pub fn new(config: VideoTransformConfig) -> Self {
        Self {
            config,
            scaler: None,
        }
    }

    /**
        Current configuration.
    */
    pub fn config(&self) -> &VideoTransformConfig {
        &self.config
    }

    /**
        Replace the configuration. The scaler is rebuilt lazily if needed.
    */
    pub fn set_config(&mut self, config: VideoTransformConfig) {
        self.config = config;
    }

    /**
        Transform a frame into the configured format and size.

        Frames already in the target format and size are returned as a
        copy without going through FFmpeg.
    */
    pub fn transform(&mut self, frame: &VideoFrame) -> Result<VideoFrame> {
        let (width, height) = self.config.output_size(frame.width, frame.height);
        if width == 0 || height == 0 || frame.width == 0 || frame.height == 0 {
            return Err(Error::invalid_data(format!(
                "cannot scale {}x{} to {width}x{height}",
                frame.width, frame.height
            )));
        }
        if frame.data.len() < frame.expected_data_len() {
            return Err(Error::invalid_data(format!(
                "frame holds {} bytes, {:?} {}x{} needs {}",
                frame.data.len(),
                frame.format,
                frame.width,
                frame.height,
                frame.expected_data_len()
            )));
        }

        let format = self.config.format;
        if frame.format == format && frame.width == width && frame.height == height {
            return Ok(frame.clone());
        }

        let key = ScalerKey {
            input: (frame.format, frame.width, frame.height),
            output: (format, width, height),
            algorithm: self.config.algorithm,
        };
        if !matches!(&self.scaler, Some(s) if s.key == key) {
            self.scaler = Some(Scaler::new(key)?);
        }
        let Some(scaler) = self.scaler.as_mut() else {
            return Err(Error::codec("scaler unavailable"));
        };

        let input = to_ffmpeg_frame(frame)?;
        let mut output = VideoFrameFFmpeg::empty();
        scaler
            .context
            .run(&input, &mut output)
            .map_err(|e| Error::codec(e.to_string()))?;

        Ok(VideoFrame::new(
            pack_planes(&output, format),
            width,
            height,
            format,
            frame.pts,
            frame.time_base,
        ))
    }
}

impl std::fmt::Debug for VideoTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoTransform")
            .field("config", &self.config)
            .field("scaler", &self.scaler.as_ref().map(|s| s.key))
            .finish()
    }
}

/**
    Copy a tightly packed frame into a freshly allocated FFmpeg frame.
*/
fn to_ffmpeg_frame(frame: &VideoFrame) -> Result<VideoFrameFFmpeg> {
    let mut output = VideoFrameFFmpeg::new(to_ffmpeg_pixel(frame.format)?, frame.width, frame.height);

    let mut offset = 0;
    for (index, plane) in frame.format.planes(frame.width, frame.height).iter().enumerate() {
        let stride = output.stride(index);
        let target = output.data_mut(index);
        for row in 0..plane.rows {
            let src = &frame.data[offset..offset + plane.row_bytes];
            target[row * stride..row * stride + plane.row_bytes].copy_from_slice(src);
            offset += plane.row_bytes;
        }
    }

    Ok(output)
}

/**
    Copy the planes of an FFmpeg frame into a tightly packed buffer.
*/
fn pack_planes(frame: &VideoFrameFFmpeg, format: PixelFormat) -> Vec<u8> {
    let planes = format.planes(frame.width(), frame.height());
    let mut data = Vec::with_capacity(planes.iter().map(|p| p.size()).sum());

    for (index, plane) in planes.iter().enumerate() {
        let stride = frame.stride(index);
        let source = frame.data(index);
        for row in 0..plane.rows {
            data.extend_from_slice(&source[row * stride..row * stride + plane.row_bytes]);
        }
    }

    data
}

fn to_ffmpeg_pixel(format: PixelFormat) -> Result<Pixel> {
    Ok(match format {
        PixelFormat::Yuv420p => Pixel::YUV420P,
        PixelFormat::Nv12 => Pixel::NV12,
        PixelFormat::Bgra => Pixel::BGRA,
        PixelFormat::Rgba => Pixel::RGBA,
        PixelFormat::Rgb24 => Pixel::RGB24,
        PixelFormat::Bgr24 => Pixel::BGR24,
        PixelFormat::Yuv422p => Pixel::YUV422P,
        PixelFormat::Yuv444p => Pixel::YUV444P,
        PixelFormat::Yuv420p10 => Pixel::YUV420P10LE,
        PixelFormat::Gray8 => Pixel::GRAY8,
        other => {
            return Err(Error::unsupported_format(format!(
                "no FFmpeg pixel format for {other:?}"
            )));
        }
    })
}
