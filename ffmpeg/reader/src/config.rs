/*!
    Reader configuration types.
*/

use ffmpeg_decode::VideoDecoderConfig;
use ffmpeg_transform::ScalingAlgorithm;
use ffmpeg_types::PixelFormat;

/**
    Pixel layout of the frames handed out by the reader.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Packed RGB, 3 bytes per pixel.
    #[default]
    Rgb24,
    /// Single channel luma, 1 byte per pixel.
    Gray8,
}

impl OutputFormat {
    /**
        The pixel format of frames produced for this output.
    */
    pub const fn pixel_format(self) -> PixelFormat {
        match self {
            Self::Rgb24 => PixelFormat::Rgb24,
            Self::Gray8 => PixelFormat::Gray8,
        }
    }

    /**
        Bytes per pixel of frames produced for this output.
    */
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb24 => 3,
            Self::Gray8 => 1,
        }
    }
}

/**
    Configuration for [`VideoFileReader`](crate::VideoFileReader).
*/
#[derive(Clone, Debug)]
pub struct ReaderConfig {
    /// Video decoder settings.
    pub video_decoder: VideoDecoderConfig,
    /// Interpolation used when frames are resized.
    pub scaling: ScalingAlgorithm,
    /// Decode the audio stream, if the file has one.
    pub decode_audio: bool,
    /**
        Maximum number of packets held for a stream that is not being read.

        When the caller only reads video, audio packets pile up (and the
        other way around). With a limit set, the oldest packet is dropped
        once the queue is full. `None` keeps everything.
    */
    pub packet_queue_limit: Option<usize>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            video_decoder: VideoDecoderConfig::default(),
            scaling: ScalingAlgorithm::default(),
            decode_audio: true,
            packet_queue_limit: None,
        }
    }
}

impl ReaderConfig {
    /**
        Create a new config with default settings.
    */
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Use the given interpolation when resizing frames.
    */
    pub fn with_scaling(mut self, scaling: ScalingAlgorithm) -> Self {
        self.scaling = scaling;
        self
    }

    /**
        Use a fixed number of video decoding threads.
    */
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.video_decoder = self.video_decoder.with_threads(threads);
        self
    }

    /**
        Skip the audio stream entirely. Audio reads return `Ok(None)`.
    */
    pub fn without_audio(mut self) -> Self {
        self.decode_audio = false;
        self
    }

    /**
        Bound the number of packets queued per stream.
    */
    pub fn with_packet_queue_limit(mut self, limit: usize) -> Self {
        self.packet_queue_limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ReaderConfig::new();
        assert!(config.decode_audio);
        assert_eq!(config.packet_queue_limit, None);
        assert_eq!(config.scaling, ScalingAlgorithm::Bicubic);
        assert_eq!(config.video_decoder.threads, None);
    }

    #[test]
    fn builder() {
        let config = ReaderConfig::new()
            .with_scaling(ScalingAlgorithm::Area)
            .with_threads(2)
            .without_audio()
            .with_packet_queue_limit(64);
        assert!(!config.decode_audio);
        assert_eq!(config.packet_queue_limit, Some(64));
        assert_eq!(config.scaling, ScalingAlgorithm::Area);
        assert_eq!(config.video_decoder.threads, Some(2));
    }

    #[test]
    fn output_formats() {
        assert_eq!(OutputFormat::default(), OutputFormat::Rgb24);
        assert_eq!(OutputFormat::Gray8.pixel_format(), PixelFormat::Gray8);
        assert_eq!(OutputFormat::Rgb24.bytes_per_pixel(), 3);
    }
}
