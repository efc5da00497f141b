/*!
    Stream and container metadata.
*/

use std::time::Duration;

use crate::Rational;

/**
    Metadata for the selected video stream of a container.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct VideoStreamInfo {
    /// Index of the stream in the container.
    pub index: usize,
    /// Coded frame width in pixels.
    pub width: u32,
    /// Coded frame height in pixels.
    pub height: u32,
    /// Average frame rate, if the container knows it.
    pub frame_rate: Option<Rational>,
    /// Time base of the stream's timestamps.
    pub time_base: Rational,
    /**
        Number of frames as reported by the container.

        Some containers report nothing or a wrong value here; see
        [`VideoStreamInfo::estimated_frame_count`].
    */
    pub frame_count: Option<u64>,
    /// Stream duration, if known.
    pub duration: Option<Duration>,
    /// Short codec name (e.g. `h264`).
    pub codec_name: String,
}

impl VideoStreamInfo {
    /**
        Best guess at the number of frames in the stream.

        Uses the container's frame count when present, otherwise the
        stream duration multiplied by the frame rate. No decoding pass is
        made, so the value can be off for variable frame rate content.
    */
    pub fn estimated_frame_count(&self) -> u64 {
        if let Some(count) = self.frame_count.filter(|&c| c > 0) {
            return count;
        }
        match (self.duration, self.frame_rate) {
            (Some(duration), Some(rate)) if rate.is_positive() => {
                (duration.as_secs_f64() * rate.to_f64()).round() as u64
            }
            _ => 0,
        }
    }

    /**
        Duration of a single frame in seconds, if the frame rate is known.
    */
    pub fn frame_duration(&self) -> Option<f64> {
        self.frame_rate
            .filter(|rate| rate.is_positive())
            .map(|rate| 1.0 / rate.to_f64())
    }
}

/**
    Metadata for the selected audio stream of a container.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct AudioStreamInfo {
    /// Index of the stream in the container.
    pub index: usize,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of channels.
    pub channels: u16,
    /// Time base of the stream's timestamps.
    pub time_base: Rational,
    /// Stream duration, if known.
    pub duration: Option<Duration>,
    /// Short codec name (e.g. `aac`).
    pub codec_name: String,
}

/**
    Combined information about an opened container.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct MediaInfo {
    /// Container format name (e.g. `avi`, `mov,mp4,m4a,3gp,3g2,mj2`).
    pub format_name: String,
    /**
        Presentation time of the first frame in seconds, zero if unknown.

        Frame timestamps and seek targets are on the same timeline, so for
        containers starting late (MPEG-TS often starts around 1.4s) the
        first frame reports this time rather than zero. Can be negative.
    */
    pub start_time: f64,
    /// Container duration, counted from `start_time`, if known.
    pub duration: Option<Duration>,
    /// First video stream, if any.
    pub video: Option<VideoStreamInfo>,
    /// First audio stream, if any.
    pub audio: Option<AudioStreamInfo>,
}

impl MediaInfo {
    /**
        Returns true if the container has a video stream.
    */
    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }

    /**
        Returns true if the container has an audio stream.
    */
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /**
        Presentation time in seconds at which the container ends, if known.
    */
    pub fn end_time(&self) -> Option<f64> {
        self.duration
            .map(|duration| self.start_time + duration.as_secs_f64())
    }
}
