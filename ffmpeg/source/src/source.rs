/*!
    Demuxing source over an opened container.
*/

use std::path::Path;

use ffmpeg_next::format::context::Input;
use log::{debug, trace, warn};

use ffmpeg_types::{Error, MediaInfo, Packet, Rational, Result, StreamType};

use crate::codec_config::CodecConfig;
use crate::{convert, probe};

// Give up on a container that keeps failing reads instead of looping forever
const MAX_CONSECUTIVE_READ_ERRORS: u32 = 16;

/**
    Which of the selected streams a source delivers packets for.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StreamFilter {
    /// Video and audio packets.
    #[default]
    All,
    /// Only video packets.
    VideoOnly,
    /// Only audio packets.
    AudioOnly,
}

impl StreamFilter {
    fn includes(self, stream_type: StreamType) -> bool {
        matches!(
            (self, stream_type),
            (Self::All, _)
                | (Self::VideoOnly, StreamType::Video)
                | (Self::AudioOnly, StreamType::Audio)
        )
    }
}

/**
    Configuration for opening a source.
*/
#[derive(Clone, Debug, Default)]
pub struct SourceConfig {
    /// Streams to deliver packets for.
    pub filter: StreamFilter,
}

impl SourceConfig {
    /**
        Create a new config with default settings (all selected streams).
    */
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Set the stream filter.
    */
    pub fn with_filter(mut self, filter: StreamFilter) -> Self {
        self.filter = filter;
        self
    }
}

/**
    Open a media file for reading, delivering both video and audio packets.
*/
pub fn open<P: AsRef<Path>>(path: P) -> Result<Source> {
    open_with_config(path, SourceConfig::default())
}

/**
    Open a media file for reading with the given configuration.
*/
pub fn open_with_config<P: AsRef<Path>>(path: P, config: SourceConfig) -> Result<Source> {
    let path = path.as_ref();
    let input = probe::open_input(path)?;
    let selection = probe::inspect(&input)?;

    let video = selection
        .info
        .video
        .as_ref()
        .filter(|_| config.filter.includes(StreamType::Video))
        .map(|v| (v.index, v.time_base));
    let audio = selection
        .info
        .audio
        .as_ref()
        .filter(|_| config.filter.includes(StreamType::Audio))
        .map(|a| (a.index, a.time_base));

    debug!(
        "[source] opened {} ({}): video {:?}, audio {:?}",
        path.display(),
        selection.info.format_name,
        video.map(|(index, _)| index),
        audio.map(|(index, _)| index),
    );

    Ok(Source {
        input,
        video_codec: selection.video_codec.filter(|_| video.is_some()),
        audio_codec: selection.audio_codec.filter(|_| audio.is_some()),
        info: selection.info,
        video,
        audio,
        eof: false,
    })
}

/**
    A demuxing source over an opened container.

    Produces packets for the selected streams in container order. Packets
    of other streams are dropped.
*/
pub struct Source {
    input: Input,
    info: MediaInfo,
    video: Option<(usize, Rational)>,
    audio: Option<(usize, Rational)>,
    video_codec: Option<CodecConfig>,
    audio_codec: Option<CodecConfig>,
    eof: bool,
}

impl Source {
    /**
        Metadata of the opened container.
    */
    pub fn media_info(&self) -> &MediaInfo {
        &self.info
    }

    /**
        Take the codec configuration of the video stream.

        Returns `None` if there is no selected video stream, or if the
        configuration was already taken.
    */
    pub fn take_video_codec_config(&mut self) -> Option<CodecConfig> {
        self.video_codec.take()
    }

    /**
        Take the codec configuration of the audio stream.
    */
    pub fn take_audio_codec_config(&mut self) -> Option<CodecConfig> {
        self.audio_codec.take()
    }

    /**
        Time base of the selected video stream.
    */
    pub fn video_time_base(&self) -> Option<Rational> {
        self.video.map(|(_, time_base)| time_base)
    }

    /**
        Time base of the selected audio stream.
    */
    pub fn audio_time_base(&self) -> Option<Rational> {
        self.audio.map(|(_, time_base)| time_base)
    }

    /**
        Returns true once the end of the container has been reached.
    */
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /**
        Read the next packet of a selected stream.

        Returns `Ok(None)` at the end of the container, and keeps returning
        it until the source is seeked.
    */
    pub fn next_packet(&mut self) -> Result<Option<Packet>> {
        if self.eof {
            return Ok(None);
        }

        let mut errors = 0;
        loop {
            let mut packet = ffmpeg_next::Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {}
                Err(ffmpeg_next::Error::Eof) => {
                    debug!("[source] end of container");
                    self.eof = true;
                    return Ok(None);
                }
                Err(e) => {
                    errors += 1;
                    if errors >= MAX_CONSECUTIVE_READ_ERRORS {
                        warn!("[source] giving up after {errors} read errors: {e}");
                        self.eof = true;
                        return Err(Error::invalid_data(e.to_string()));
                    }
                    warn!("[source] read error: {e}");
                    continue;
                }
            }

            let index = packet.stream();
            let (stream_type, time_base) = match (self.video, self.audio) {
                (Some((v, tb)), _) if v == index => (StreamType::Video, tb),
                (_, Some((a, tb))) if a == index => (StreamType::Audio, tb),
                _ => continue,
            };

            let packet = convert::packet(&packet, stream_type, time_base);
            trace!(
                "[source] {} packet pts={:?} key={} size={}",
                stream_type.name(),
                packet.pts,
                packet.is_keyframe,
                packet.data.len()
            );
            return Ok(Some(packet));
        }
    }

    /**
        Seek to the closest keyframe at or before `seconds`.

        Packets read afterwards may start before the requested time; it is
        up to the caller to decode forward to the exact position.
    */
    pub fn seek(&mut self, seconds: f64) -> Result<()> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(Error::seek(format!("invalid seek target {seconds}")));
        }

        let timestamp = convert::seek_timestamp(seconds);
        self.input
            .seek(timestamp, ..=timestamp)
            .map_err(|e| Error::seek(format!("{seconds:.3}s: {e}")))?;

        debug!("[source] seeked to {seconds:.3}s");
        self.eof = false;
        Ok(())
    }
}

impl Iterator for Source {
    type Item = Result<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_packet().transpose()
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("format", &self.info.format_name)
            .field("video", &self.video)
            .field("audio", &self.audio)
            .field("eof", &self.eof)
            .finish_non_exhaustive()
    }
}
