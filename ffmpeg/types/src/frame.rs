/*!
    Decoded frame types.
*/

use crate::{ChannelLayout, PixelFormat, Pts, Rational, SampleFormat};

/**
    A decoded video frame.

    Pixel data is tightly packed: rows carry no padding and planes follow
    each other in the order given by [`PixelFormat::planes`]. Frames handed
    out by the reader are either [`PixelFormat::Rgb24`] or
    [`PixelFormat::Gray8`] and are owned by the caller.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct VideoFrame {
    /// Raw pixel data.
    pub data: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format of the data.
    pub format: PixelFormat,
    /// Presentation timestamp (None for frames without timing).
    pub pts: Option<Pts>,
    /// Time base for interpreting the PTS.
    pub time_base: Rational,
}

impl VideoFrame {
    /**
        Create a new video frame.
    */
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        pts: Option<Pts>,
        time_base: Rational,
    ) -> Self {
        Self {
            data,
            width,
            height,
            format,
            pts,
            time_base,
        }
    }

    /**
        Returns the presentation time in seconds, if PTS is set.
    */
    pub fn timestamp(&self) -> Option<f64> {
        self.pts.map(|pts| pts.to_seconds(self.time_base))
    }

    /**
        Returns the presentation time as a Duration, if PTS is set.
    */
    pub fn presentation_time(&self) -> Option<std::time::Duration> {
        self.pts.map(|pts| pts.to_duration(self.time_base))
    }

    /**
        Returns the expected data length in bytes for this frame's size and format.
    */
    pub fn expected_data_len(&self) -> usize {
        self.format.buffer_size(self.width, self.height)
    }
}

/**
    A decoded audio frame.

    Contains raw sample data in the format specified by `format`.
    Samples are interleaved for multi-channel audio.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct AudioFrame {
    /**
        Raw sample data as bytes.

        Interpret according to `format` and `channels`.
        For interleaved stereo S16: [L0, R0, L1, R1, ...]
    */
    pub data: Vec<u8>,
    /**
        Number of samples per channel.
    */
    pub samples: usize,
    /**
        Sample rate in Hz.
    */
    pub sample_rate: u32,
    /**
        Channel layout.
    */
    pub channels: ChannelLayout,
    /**
        Sample format.
    */
    pub format: SampleFormat,
    /**
        Presentation timestamp (None for frames without timing).
    */
    pub pts: Option<Pts>,
    /**
        Time base for interpreting the PTS.
    */
    pub time_base: Rational,
}

impl AudioFrame {
    /**
        Create a new audio frame.
    */
    pub fn new(
        data: Vec<u8>,
        samples: usize,
        sample_rate: u32,
        channels: ChannelLayout,
        format: SampleFormat,
        pts: Option<Pts>,
        time_base: Rational,
    ) -> Self {
        Self {
            data,
            samples,
            sample_rate,
            channels,
            format,
            pts,
            time_base,
        }
    }

    /**
        Returns the presentation time in seconds, if PTS is set.
    */
    pub fn timestamp(&self) -> Option<f64> {
        self.pts.map(|pts| pts.to_seconds(self.time_base))
    }

    /**
        Returns the length of this frame in seconds, based on sample count and rate.
    */
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples as f64 / self.sample_rate as f64
    }

    /**
        Returns the total number of samples (samples per channel * channels).
    */
    pub fn total_samples(&self) -> usize {
        self.samples * self.channels.channels() as usize
    }

    /**
        Returns the expected data length in bytes.
    */
    pub fn expected_data_len(&self) -> usize {
        self.total_samples() * self.format.bytes_per_sample()
    }
}

// Frames are handed to callers who may move them to other threads
static_assertions::assert_impl_all!(VideoFrame: Send, Sync);
static_assertions::assert_impl_all!(AudioFrame: Send, Sync);
