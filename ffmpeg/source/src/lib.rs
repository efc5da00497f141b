/*!
    Media file opening and demuxing for the ffmpeg reader crates.

    This crate handles the input side of the pipeline. It opens a container
    file, picks the streams to read, and produces encoded packets that the
    decode crate turns into frames.

    # Example

    ```ignore
    use ffmpeg_source::{open, probe, StreamType};

    // Probe a file for metadata
    let info = probe("video.mp4")?;
    println!("Duration: {:?}", info.duration);
    println!("Has audio: {}", info.has_audio());

    // Open and read packets
    let mut source = open("video.mp4")?;
    while let Some(packet) = source.next_packet()? {
        match packet.stream_type {
            StreamType::Video => { /* decode video */ }
            StreamType::Audio => { /* decode audio */ }
        }
    }
    ```

    # Stream Selection

    The first video stream (cover art pictures are skipped) and the first
    audio stream of the container are selected. Packets of every other
    stream are dropped while reading. [`StreamFilter`] narrows the selection
    further when only one kind of packet is wanted.

    # Seeking

    [`Source::seek`] moves the read position backward to the closest
    keyframe at or before the requested time. Decoders must be reset after
    a seek, since packets no longer follow the previous ones.
*/

pub use ffmpeg_types::{
    AudioStreamInfo, Error, MediaInfo, Packet, Result, StreamType, VideoStreamInfo,
};

mod codec_config;
mod convert;
mod probe;
mod source;

pub use codec_config::CodecConfig;
pub use probe::probe;
pub use source::{Source, SourceConfig, StreamFilter, open, open_with_config};
