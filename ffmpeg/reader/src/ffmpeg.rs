/*!
    The FFmpeg backend, built on the source, decode and transform crates.
*/

use std::path::Path;

use log::{debug, warn};

use ffmpeg_decode::{AudioDecoder, AudioDecoderConfig, VideoDecoder};
use ffmpeg_source::{Source, SourceConfig, StreamFilter};
use ffmpeg_transform::{VideoTransform, VideoTransformConfig};
use ffmpeg_types::{AudioFrame, Error, Packet, PixelFormat, Result, VideoFrame};

use crate::backend::{FrameConverter, FrameDecoder, MediaBackend, OpenedMedia, PacketSource};
use crate::config::ReaderConfig;
use crate::error::ReaderError;

/**
    Opens files through FFmpeg. This is the default backend of
    [`VideoFileReader`](crate::VideoFileReader).
*/
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegBackend;

impl MediaBackend for FfmpegBackend {
    type Source = Source;
    type VideoDecoder = VideoDecoder;
    type AudioDecoder = AudioDecoder;
    type Converter = VideoTransform;

    fn open(
        &self,
        path: &Path,
        config: &ReaderConfig,
    ) -> std::result::Result<OpenedMedia<Self>, ReaderError> {
        let filter = if config.decode_audio {
            StreamFilter::All
        } else {
            StreamFilter::VideoOnly
        };

        let mut source =
            ffmpeg_source::open_with_config(path, SourceConfig::new().with_filter(filter))
                .map_err(|e| open_error(path, e))?;
        let info = source.media_info().clone();

        let Some(video_info) = info.video.as_ref() else {
            if info.has_audio() {
                return Err(ReaderError::UnsupportedFormat(format!(
                    "{}: no video stream",
                    path.display()
                )));
            }
            return Err(ReaderError::NoDecodableStreams(path.to_path_buf()));
        };

        let (Some(codec), Some(time_base)) =
            (source.take_video_codec_config(), source.video_time_base())
        else {
            return Err(ReaderError::UnsupportedFormat(format!(
                "{}: video stream is not readable",
                path.display()
            )));
        };

        let video = VideoDecoder::new(codec, time_base, config.video_decoder.clone()).map_err(
            |e| ReaderError::UnsupportedFormat(format!("video codec {}: {e}", video_info.codec_name)),
        )?;

        let audio = match (source.take_audio_codec_config(), source.audio_time_base()) {
            (Some(codec), Some(time_base)) => {
                match AudioDecoder::new(codec, time_base, AudioDecoderConfig::new()) {
                    Ok(decoder) => Some(decoder),
                    Err(e) => {
                        warn!("[reader] audio disabled for {}: {e}", path.display());
                        None
                    }
                }
            }
            _ => None,
        };

        debug!(
            "[reader] ffmpeg backend opened {} ({}, audio: {})",
            path.display(),
            video_info.codec_name,
            audio.is_some()
        );

        let converter = VideoTransform::new(
            VideoTransformConfig::to_rgb24().with_algorithm(config.scaling),
        );

        Ok(OpenedMedia {
            info,
            source,
            video,
            audio,
            converter,
        })
    }
}

fn open_error(path: &Path, error: Error) -> ReaderError {
    if error.is_not_found() {
        return ReaderError::NotFound(path.to_path_buf());
    }
    match error {
        Error::StreamNotFound { .. } => ReaderError::NoDecodableStreams(path.to_path_buf()),
        Error::UnsupportedFormat { message } => ReaderError::UnsupportedFormat(message),
        other => ReaderError::UnsupportedFormat(format!("{}: {other}", path.display())),
    }
}

impl PacketSource for Source {
    fn next_packet(&mut self) -> Result<Option<Packet>> {
        Source::next_packet(self)
    }

    fn seek(&mut self, seconds: f64) -> Result<()> {
        Source::seek(self, seconds)
    }
}

impl FrameDecoder for VideoDecoder {
    type Frame = VideoFrame;

    fn decode(&mut self, packet: &Packet) -> Result<Vec<VideoFrame>> {
        VideoDecoder::decode(self, packet)
    }

    fn flush(&mut self) -> Result<Vec<VideoFrame>> {
        VideoDecoder::flush(self)
    }

    fn reset(&mut self) {
        VideoDecoder::reset(self);
    }
}

impl FrameDecoder for AudioDecoder {
    type Frame = AudioFrame;

    fn decode(&mut self, packet: &Packet) -> Result<Vec<AudioFrame>> {
        AudioDecoder::decode(self, packet)
    }

    fn flush(&mut self) -> Result<Vec<AudioFrame>> {
        AudioDecoder::flush(self)
    }

    fn reset(&mut self) {
        AudioDecoder::reset(self);
    }
}

impl FrameConverter for VideoTransform {
    fn convert(
        &mut self,
        frame: &VideoFrame,
        format: PixelFormat,
        width: u32,
        height: u32,
    ) -> Result<VideoFrame> {
        let config = VideoTransformConfig::new(format)
            .with_size(width, height)
            .with_algorithm(self.config().algorithm);
        if *self.config() != config {
            self.set_config(config);
        }
        self.transform(frame)
    }
}
