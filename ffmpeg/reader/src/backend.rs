/*!
    Collaborator traits the reader is built on.

    The reader never talks to FFmpeg directly. It pulls packets from a
    [`PacketSource`], turns them into frames with [`FrameDecoder`]s and
    converts video frames with a [`FrameConverter`]. A [`MediaBackend`]
    opens a file and hands out all of them at once.
*/

use std::path::Path;

use ffmpeg_types::{AudioFrame, MediaInfo, Packet, PixelFormat, Result, VideoFrame};

use crate::config::ReaderConfig;
use crate::error::ReaderError;

/**
    Demuxed packets of the selected streams, in container order.
*/
pub trait PacketSource {
    /**
        Read the next packet, or `None` at the end of the container.
    */
    fn next_packet(&mut self) -> Result<Option<Packet>>;

    /**
        Move to the closest keyframe at or before `seconds`.
    */
    fn seek(&mut self, seconds: f64) -> Result<()>;
}

/**
    Packet to frame decoding for one stream.
*/
pub trait FrameDecoder {
    type Frame;

    /**
        Decode a packet. May return any number of frames.
    */
    fn decode(&mut self, packet: &Packet) -> Result<Vec<Self::Frame>>;

    /**
        Drain frames held back by the decoder at the end of the stream.
    */
    fn flush(&mut self) -> Result<Vec<Self::Frame>>;

    /**
        Drop all in-flight state, ready for packets from a new position.
    */
    fn reset(&mut self);
}

/**
    Pixel format conversion and resizing of decoded video frames.
*/
pub trait FrameConverter {
    fn convert(
        &mut self,
        frame: &VideoFrame,
        format: PixelFormat,
        width: u32,
        height: u32,
    ) -> Result<VideoFrame>;
}

/**
    Opens media files, producing everything a reader needs to decode them.
*/
pub trait MediaBackend {
    type Source: PacketSource;
    type VideoDecoder: FrameDecoder<Frame = VideoFrame>;
    type AudioDecoder: FrameDecoder<Frame = AudioFrame>;
    type Converter: FrameConverter;

    /**
        Open a file.

        Fails with [`ReaderError::NotFound`] for missing files,
        [`ReaderError::NoDecodableStreams`] when there is neither a video
        nor an audio stream, and [`ReaderError::UnsupportedFormat`] when
        the container or the video codec cannot be handled. A broken audio
        stream is not an error: `audio` is `None` instead.
    */
    fn open(
        &self,
        path: &Path,
        config: &ReaderConfig,
    ) -> std::result::Result<OpenedMedia<Self>, ReaderError>;
}

/**
    An opened media file.
*/
pub struct OpenedMedia<B: MediaBackend + ?Sized> {
    pub info: MediaInfo,
    pub source: B::Source,
    pub video: B::VideoDecoder,
    pub audio: Option<B::AudioDecoder>,
    pub converter: B::Converter,
}
