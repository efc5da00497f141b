/*!
    Packet decoding for the ffmpeg reader crates.

    This crate turns encoded packets into raw frames. Video frames come out
    tightly packed in one of the formats of [`ffmpeg_types::PixelFormat`];
    codecs producing anything more exotic are converted to YUV 4:2:0 on the
    way out. Audio frames come out interleaved in the codec's sample format.

    # Example

    ```ignore
    use ffmpeg_source::open;
    use ffmpeg_decode::{VideoDecoder, VideoDecoderConfig};

    let mut source = open("video.mp4")?;

    let config = VideoDecoderConfig::new().with_threads(4);
    let codec_config = source.take_video_codec_config().unwrap();
    let time_base = source.video_time_base().unwrap();
    let mut decoder = VideoDecoder::new(codec_config, time_base, config)?;

    for packet in source {
        let packet = packet?;
        if packet.is_video() {
            for frame in decoder.decode(&packet)? {
                // Process frame
            }
        }
    }

    // Codecs with frame reordering hold back frames until flushed
    let remaining = decoder.flush()?;
    ```

    # Seeking

    Decoders keep reference frames and delayed output between packets.
    After the source seeks, call `reset` on each decoder before feeding it
    packets from the new position.
*/

pub use ffmpeg_source::CodecConfig;
pub use ffmpeg_types::{AudioFrame, Error, Packet, Result, VideoFrame};

mod audio;
mod config;
mod packet;
mod video;

pub use audio::AudioDecoder;
pub use config::{AudioDecoderConfig, VideoDecoderConfig};
pub use video::VideoDecoder;
