/*!
    Video decoder implementation.
*/

use ffmpeg_next::{
    codec::{self, decoder::Video as VideoDecoderFFmpeg, threading},
    ffi,
    format::Pixel,
    software::scaling,
    util::frame::video::Video as VideoFrameFFmpeg,
};
use log::{debug, warn};

use ffmpeg_source::CodecConfig;
use ffmpeg_types::{Error, Packet, PixelFormat, Pts, Rational, Result, VideoFrame};

use crate::config::VideoDecoderConfig;
use crate::packet;

/**
    Converts frames in formats we have no type for into YUV 4:2:0.

    Keyed on the input format and size, recreated when either changes.
*/
struct Normalizer {
    context: scaling::Context,
    key: (Pixel, u32, u32),
}

impl Normalizer {
    fn new(key: (Pixel, u32, u32)) -> Result<Self> {
        let (format, width, height) = key;
        let context = scaling::Context::get(
            format,
            width,
            height,
            Pixel::YUV420P,
            width,
            height,
            scaling::Flags::BICUBIC,
        )
        .map_err(|e| Error::unsupported_format(format!("pixel format {format:?}: {e}")))?;

        debug!("[video_decode] converting {format:?} {width}x{height} to yuv420p");
        Ok(Self { context, key })
    }
}

/**
    Video decoder.

    Decodes video packets into tightly packed frames.
*/
pub struct VideoDecoder {
    decoder: VideoDecoderFFmpeg,
    time_base: Rational,
    normalizer: Option<Normalizer>,
}

impl VideoDecoder {
    /**
        Create a new video decoder from codec configuration.

        # Arguments

        * `codec_config` - Codec configuration from the source
        * `time_base` - Time base for the video stream
        * `config` - Decoder configuration
    */
    pub fn new(
        codec_config: CodecConfig,
        time_base: Rational,
        config: VideoDecoderConfig,
    ) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;

        let codec_name = codec_config.codec_name();
        let parameters = codec_config.into_parameters();

        let mut decoder_ctx = codec::context::Context::from_parameters(parameters)
            .map_err(|e| Error::codec(e.to_string()))?;

        decoder_ctx.set_threading(threading::Config {
            kind: threading::Type::Frame,
            count: config.threads.unwrap_or(0),
            ..Default::default()
        });

        let decoder = decoder_ctx
            .decoder()
            .video()
            .map_err(|e| Error::codec(format!("{codec_name}: {e}")))?;

        debug!(
            "[video_decode] opened {codec_name} decoder, {}x{} {:?}",
            decoder.width(),
            decoder.height(),
            decoder.format()
        );

        Ok(Self {
            decoder,
            time_base,
            normalizer: None,
        })
    }

    /**
        Get the time base for this decoder.
    */
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /**
        Get the coded width of the stream.
    */
    pub fn width(&self) -> u32 {
        self.decoder.width()
    }

    /**
        Get the coded height of the stream.
    */
    pub fn height(&self) -> u32 {
        self.decoder.height()
    }

    /**
        Decode a packet, returning decoded frames.

        Codecs with frame reordering may return nothing for the first few
        packets and then one frame per packet. Empty packets are ignored.
    */
    pub fn decode(&mut self, packet: &Packet) -> Result<Vec<VideoFrame>> {
        if packet.data.is_empty() {
            return Ok(Vec::new());
        }

        self.decoder
            .send_packet(&packet::to_ffmpeg(packet))
            .map_err(|e| Error::codec(e.to_string()))?;

        self.receive_frames()
    }

    /**
        Flush the decoder to get any remaining buffered frames.

        Call this at end of stream to retrieve any buffered frames.
    */
    pub fn flush(&mut self) -> Result<Vec<VideoFrame>> {
        self.decoder
            .send_eof()
            .map_err(|e| Error::codec(e.to_string()))?;

        self.receive_frames()
    }

    /**
        Reset the decoder after a seek.

        Drops reference frames and delayed output, including the end of
        stream state left behind by a flush.
    */
    pub fn reset(&mut self) {
        self.decoder.flush();
    }

    /**
        Receive all available frames from the decoder.
    */
    fn receive_frames(&mut self) -> Result<Vec<VideoFrame>> {
        let mut frames = Vec::new();
        let mut decoded_frame = VideoFrameFFmpeg::empty();

        loop {
            match self.decoder.receive_frame(&mut decoded_frame) {
                Ok(()) => match self.convert_frame(&decoded_frame) {
                    Ok(frame) => frames.push(frame),
                    Err(e) => {
                        warn!("[video_decode] frame conversion error: {e}");
                    }
                },
                Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::AVERROR(ffi::EAGAIN) => {
                    break;
                }
                Err(ffmpeg_next::Error::Eof) => {
                    break;
                }
                Err(e) => {
                    return Err(Error::codec(e.to_string()));
                }
            }
        }

        Ok(frames)
    }

    /**
        Convert an FFmpeg video frame to our VideoFrame type.
    */
    fn convert_frame(&mut self, frame: &VideoFrameFFmpeg) -> Result<VideoFrame> {
        let width = frame.width();
        let height = frame.height();

        if width == 0 || height == 0 {
            return Err(Error::invalid_data("video frame has no pixels"));
        }

        // Prefer the frame's own PTS, then FFmpeg's best effort guess
        let pts = frame.pts().or_else(|| frame.timestamp()).map(Pts);

        let (format, data) = match pixel_format_from_ffmpeg(frame.format()) {
            Some(format) => (format, copy_planes(frame, format)?),
            None => {
                let normalized = self.normalize(frame)?;
                (
                    PixelFormat::Yuv420p,
                    copy_planes(&normalized, PixelFormat::Yuv420p)?,
                )
            }
        };

        Ok(VideoFrame::new(
            data,
            width,
            height,
            format,
            pts,
            self.time_base,
        ))
    }

    /**
        Convert a frame in an unmapped pixel format to YUV 4:2:0.
    */
    fn normalize(&mut self, frame: &VideoFrameFFmpeg) -> Result<VideoFrameFFmpeg> {
        let key = (frame.format(), frame.width(), frame.height());
        if !matches!(&self.normalizer, Some(n) if n.key == key) {
            self.normalizer = Some(Normalizer::new(key)?);
        }
        let Some(normalizer) = self.normalizer.as_mut() else {
            return Err(Error::codec("pixel format converter unavailable"));
        };

        let mut output = VideoFrameFFmpeg::empty();
        normalizer
            .context
            .run(frame, &mut output)
            .map_err(|e| Error::codec(e.to_string()))?;
        Ok(output)
    }
}

/**
    Copy the planes of an FFmpeg frame into a tightly packed buffer.

    FFmpeg pads rows to its alignment and may use negative line sizes for
    bottom-up images, so rows are copied one at a time.
*/
fn copy_planes(frame: &VideoFrameFFmpeg, format: PixelFormat) -> Result<Vec<u8>> {
    let planes = format.planes(frame.width(), frame.height());
    let mut data = Vec::with_capacity(planes.iter().map(|p| p.size()).sum());

    for (index, plane) in planes.iter().enumerate() {
        // SAFETY: reading plain fields of a frame we hold a reference to
        let (ptr, stride) = unsafe {
            let raw = frame.as_ptr();
            ((*raw).data[index], (*raw).linesize[index] as isize)
        };

        if ptr.is_null() {
            return Err(Error::invalid_data(format!("video plane {index} is missing")));
        }
        if stride.unsigned_abs() < plane.row_bytes {
            return Err(Error::invalid_data(format!(
                "video plane {index} line size {stride} is below {} bytes",
                plane.row_bytes
            )));
        }

        for row in 0..plane.rows {
            // SAFETY: FFmpeg allocates `rows` lines of `stride` bytes from the
            // plane pointer, each holding at least `row_bytes` of pixel data
            let line = unsafe {
                std::slice::from_raw_parts(ptr.offset(row as isize * stride), plane.row_bytes)
            };
            data.extend_from_slice(line);
        }
    }

    Ok(data)
}

/**
    Convert FFmpeg pixel format to our PixelFormat.
*/
fn pixel_format_from_ffmpeg(format: Pixel) -> Option<PixelFormat> {
    match format {
        Pixel::YUV420P => Some(PixelFormat::Yuv420p),
        Pixel::NV12 => Some(PixelFormat::Nv12),
        Pixel::BGRA => Some(PixelFormat::Bgra),
        Pixel::RGBA => Some(PixelFormat::Rgba),
        Pixel::RGB24 => Some(PixelFormat::Rgb24),
        Pixel::BGR24 => Some(PixelFormat::Bgr24),
        Pixel::YUV422P => Some(PixelFormat::Yuv422p),
        Pixel::YUV444P => Some(PixelFormat::Yuv444p),
        Pixel::YUV420P10LE => Some(PixelFormat::Yuv420p10),
        Pixel::GRAY8 => Some(PixelFormat::Gray8),
        _ => None,
    }
}

impl std::fmt::Debug for VideoDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoDecoder")
            .field("time_base", &self.time_base)
            .field("width", &self.decoder.width())
            .field("height", &self.decoder.height())
            .field("format", &self.decoder.format())
            .finish_non_exhaustive()
    }
}
