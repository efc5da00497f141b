/*!
    Shared types for the ffmpeg reader crates.

    This crate defines the vocabulary that crosses crate boundaries between
    the source, decode, transform and reader crates. It has no dependency on
    FFmpeg, so anything that only needs to describe frames, packets and
    streams can depend on it without pulling in FFmpeg bindings.

    # Core Types

    - [`Rational`] - Rational numbers for time bases and frame rates
    - [`Pts`] and [`MediaDuration`] - Timestamps in time_base units
    - [`VideoFrame`] and [`AudioFrame`] - Decoded frame data
    - [`Packet`] and [`StreamType`] - Encoded packet data

    # Format Types

    - [`PixelFormat`] and [`PlaneLayout`] - Video pixel formats and their memory layout
    - [`SampleFormat`] - Audio sample formats
    - [`ChannelLayout`] - Audio channel layouts

    # Stream Information

    - [`VideoStreamInfo`] and [`AudioStreamInfo`] - Stream metadata
    - [`MediaInfo`] - Combined container information

    # Error Handling

    - [`Error`] and [`Result`] - Common error types
*/

mod error;
mod format;
mod frame;
mod packet;
mod rational;
mod stream;
mod timestamp;

pub use error::{Error, Result};
pub use format::{ChannelLayout, PixelFormat, PlaneLayout, SampleFormat};
pub use frame::{AudioFrame, VideoFrame};
pub use packet::{Packet, StreamType};
pub use rational::Rational;
pub use stream::{AudioStreamInfo, MediaInfo, VideoStreamInfo};
pub use timestamp::{MediaDuration, Pts};
