/*!
    Sequential video and audio frame reader on top of the ffmpeg crates.

    [`VideoFileReader`] opens a media file and hands out decoded video
    frames one at a time, as packed RGB or grayscale at the native size or
    resized. Audio is decoded alongside, either in lockstep with the video
    or as fast as the caller asks for it. Seeking lands on the closest
    keyframe, or decodes forward to the exact frame.

    # Example

    ```ignore
    use ffmpeg_reader::{ReaderConfig, ScalingAlgorithm, VideoFileReader};

    let config = ReaderConfig::new().with_scaling(ScalingAlgorithm::Area);
    let mut reader = VideoFileReader::with_config(config);
    reader.open("video.mp4")?;

    // Jump to the first frame at or after 12.5 seconds
    let landed = reader.seek(12.5, false)?;

    while let Some(frame) = reader.read_video_frame_gray_scaled(160, 90)? {
        while let Some(chunk) = reader.read_audio_frame(true)? {
            // chunk.start is never after the frame's timestamp
        }
    }
    ```

    # Packet Routing

    Containers interleave streams, so reading a video frame often means
    reading audio packets first (and the other way around). Those packets
    are queued for the other pipeline and never dropped, unless a queue
    limit is configured with [`ReaderConfig::with_packet_queue_limit`].

    # Backends

    The reader only depends on the traits in [`backend`]. The default
    [`FfmpegBackend`] implements them with the source, decode and
    transform crates; other implementations can be plugged in with
    [`VideoFileReader::with_backend`].
*/

pub use ffmpeg_transform::ScalingAlgorithm;
pub use ffmpeg_types::{
    ChannelLayout, MediaInfo, PixelFormat, Rational, SampleFormat, VideoFrame,
};

pub mod backend;

mod audio;
mod config;
mod context;
mod error;
mod ffmpeg;
mod reader;
mod seek;
mod video;

#[cfg(test)]
mod mock;

pub use audio::AudioChunk;
pub use config::{OutputFormat, ReaderConfig};
pub use error::{ReaderError, Result};
pub use ffmpeg::FfmpegBackend;
pub use reader::VideoFileReader;
