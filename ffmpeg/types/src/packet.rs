/*!
    Encoded packet type.
*/

use crate::{MediaDuration, Pts, Rational};

/**
    Type of media stream a packet belongs to.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamType {
    /// Video stream
    Video,
    /// Audio stream
    Audio,
}

impl StreamType {
    /**
        Lowercase name, for messages.
    */
    pub const fn name(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

/**
    An encoded media packet.

    Contains compressed data from a single stream, with timing information.
    Packets are the unit of data between the source and the decoders.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct Packet {
    /// Compressed data.
    pub data: Vec<u8>,
    /// Presentation timestamp (when to display/play).
    pub pts: Option<Pts>,
    /// Decode timestamp (may differ from PTS for B-frames).
    pub dts: Option<Pts>,
    /// Duration of this packet's content.
    pub duration: MediaDuration,
    /// Time base for interpreting timestamps.
    pub time_base: Rational,
    /// Whether this is a keyframe (can be decoded independently).
    pub is_keyframe: bool,
    /// Type of stream this packet belongs to.
    pub stream_type: StreamType,
}

impl Packet {
    /**
        Create a new packet.
    */
    pub fn new(
        data: Vec<u8>,
        pts: Option<Pts>,
        dts: Option<Pts>,
        duration: MediaDuration,
        time_base: Rational,
        is_keyframe: bool,
        stream_type: StreamType,
    ) -> Self {
        Self {
            data,
            pts,
            dts,
            duration,
            time_base,
            is_keyframe,
            stream_type,
        }
    }

    /**
        Returns the presentation time in seconds, if PTS is set.
    */
    pub fn timestamp(&self) -> Option<f64> {
        self.pts.map(|pts| pts.to_seconds(self.time_base))
    }

    /**
        Returns the packet duration in seconds.
    */
    pub fn duration_seconds(&self) -> f64 {
        self.duration.to_seconds(self.time_base)
    }

    /**
        Returns true if this packet contains video data.
    */
    pub fn is_video(&self) -> bool {
        self.stream_type == StreamType::Video
    }

    /**
        Returns true if this packet contains audio data.
    */
    pub fn is_audio(&self) -> bool {
        self.stream_type == StreamType::Audio
    }
}

// Ensure Packet is Send + Sync
static_assertions::assert_impl_all!(Packet: Send, Sync);
