/*!
    The public reader state machine.
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;

use ffmpeg_types::{MediaInfo, Rational, VideoFrame, VideoStreamInfo};

use crate::audio::{AudioChunk, AudioPipeline};
use crate::backend::{MediaBackend, OpenedMedia};
use crate::config::{OutputFormat, ReaderConfig};
use crate::context::MediaContext;
use crate::error::{ReaderError, Result};
use crate::ffmpeg::FfmpegBackend;
use crate::seek::SeekController;
use crate::video::VideoPipeline;

/**
    Everything that exists only while a file is open.
*/
struct OpenMedia<B: MediaBackend> {
    path: PathBuf,
    info: MediaInfo,
    video_info: VideoStreamInfo,
    context: MediaContext<B::Source>,
    video: VideoPipeline<B::VideoDecoder, B::Converter>,
    audio: Option<AudioPipeline<B::AudioDecoder>>,
    seek: SeekController,
}

/**
    Sequential reader for video files, with audio aligned to the video.

    The reader starts out closed. After [`VideoFileReader::open`] it hands
    out video frames one at a time, audio decoded up to the current video
    position, and can seek by time. Closing (explicitly or by dropping the
    reader) releases the file; the reader can then open another one.

    ```ignore
    use ffmpeg_reader::VideoFileReader;

    let mut reader = VideoFileReader::new();
    reader.open("video.mp4")?;
    println!("{}x{} @ {} fps", reader.width()?, reader.height()?, reader.frame_rate()?);

    while let Some(frame) = reader.read_video_frame()? {
        // frame.data holds width * height * 3 bytes of RGB
        if let Some(audio) = reader.read_audio_frame(true)? {
            // audio up to and including this frame's timestamp
        }
    }
    reader.close();
    ```

    Every method except `open`, `close` and `is_open` fails with
    [`ReaderError::NotOpen`] while the reader is closed.
*/
pub struct VideoFileReader<B: MediaBackend = FfmpegBackend> {
    backend: B,
    config: ReaderConfig,
    state: Option<OpenMedia<B>>,
}

impl VideoFileReader<FfmpegBackend> {
    /**
        Create a closed reader with default settings.
    */
    pub fn new() -> Self {
        Self::with_config(ReaderConfig::default())
    }

    /**
        Create a closed reader with the given settings.
    */
    pub fn with_config(config: ReaderConfig) -> Self {
        Self::with_backend(FfmpegBackend, config)
    }
}

impl Default for VideoFileReader<FfmpegBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: MediaBackend> VideoFileReader<B> {
    /**
        Create a closed reader that opens files through `backend`.
    */
    pub fn with_backend(backend: B, config: ReaderConfig) -> Self {
        Self {
            backend,
            config,
            state: None,
        }
    }

    /**
        Settings used for files opened by this reader.
    */
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /**
        Open a media file.

        Fails with [`ReaderError::AlreadyOpen`] if a file is open.
    */
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        if self.state.is_some() {
            return Err(ReaderError::AlreadyOpen);
        }

        let path = path.as_ref();
        let OpenedMedia {
            info,
            source,
            video,
            audio,
            converter,
        } = self.backend.open(path, &self.config)?;

        let Some(video_info) = info.video.clone() else {
            return Err(ReaderError::UnsupportedFormat(format!(
                "{}: no video stream",
                path.display()
            )));
        };

        let start = info.start_time;
        let end = info
            .end_time()
            .or_else(|| video_info.duration.map(|d| start + d.as_secs_f64()));
        let context = MediaContext::new(source, audio.is_some(), self.config.packet_queue_limit);

        debug!(
            "[reader] opened {}: {}x{} {}, {:?} fps, {} frames, audio: {}",
            path.display(),
            video_info.width,
            video_info.height,
            video_info.codec_name,
            video_info.frame_rate,
            video_info.estimated_frame_count(),
            audio.is_some()
        );

        self.state = Some(OpenMedia {
            path: path.to_path_buf(),
            video: VideoPipeline::new(video, converter, video_info.frame_duration())
                .starting_at(start),
            audio: audio.map(|audio| AudioPipeline::new(audio).starting_at(start)),
            seek: SeekController::new(start, end),
            context,
            info,
            video_info,
        });
        Ok(())
    }

    /**
        Close the open file, if any. Closing a closed reader does nothing.
    */
    pub fn close(&mut self) {
        if let Some(media) = self.state.take() {
            debug!("[reader] closed {}", media.path.display());
        }
    }

    /**
        Returns true while a file is open.
    */
    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    /**
        Path of the open file.
    */
    pub fn path(&self) -> Result<&Path> {
        Ok(&self.media()?.path)
    }

    /**
        Width of the video in pixels.
    */
    pub fn width(&self) -> Result<u32> {
        Ok(self.media()?.video_info.width)
    }

    /**
        Height of the video in pixels.
    */
    pub fn height(&self) -> Result<u32> {
        Ok(self.media()?.video_info.height)
    }

    /**
        Frame rate rounded to the nearest integer, or 0 if unknown.
    */
    pub fn frame_rate(&self) -> Result<u32> {
        Ok(self
            .frame_rate_exact()?
            .map_or(0, |rate| rate.round().clamp(0, i64::from(u32::MAX)) as u32))
    }

    /**
        Frame rate as reported by the container.
    */
    pub fn frame_rate_exact(&self) -> Result<Option<Rational>> {
        Ok(self.media()?.video_info.frame_rate)
    }

    /**
        Number of frames in the video.

        This comes from container metadata, or is estimated from duration
        and frame rate when the container does not say. Some formats report
        wrong values; the number of frames actually read may differ.
    */
    pub fn frame_count(&self) -> Result<u64> {
        Ok(self.media()?.video_info.estimated_frame_count())
    }

    /**
        Short name of the video codec (e.g. `h264`).
    */
    pub fn codec_name(&self) -> Result<&str> {
        Ok(&self.media()?.video_info.codec_name)
    }

    /**
        Duration of the file, if known.
    */
    pub fn duration(&self) -> Result<Option<Duration>> {
        let media = self.media()?;
        Ok(media.info.duration.or(media.video_info.duration))
    }

    /**
        Presentation time of the first frame, in seconds.

        Zero for most files. Frame times, the current times and seek
        targets all count from the same zero as this value.
    */
    pub fn start_time(&self) -> Result<f64> {
        Ok(self.media()?.info.start_time)
    }

    /**
        Returns true if audio is being decoded for the open file.
    */
    pub fn has_audio(&self) -> Result<bool> {
        Ok(self.media()?.audio.is_some())
    }

    /**
        Full container metadata.
    */
    pub fn media_info(&self) -> Result<&MediaInfo> {
        Ok(&self.media()?.info)
    }

    /**
        Presentation time of the last video frame read, in seconds. Before
        the first read this is [`VideoFileReader::start_time`].
    */
    pub fn current_video_time(&self) -> Result<f64> {
        Ok(self.media()?.video.position())
    }

    /**
        Start time of the last audio frame read, in seconds. Zero when the
        file has no audio.
    */
    pub fn current_audio_time(&self) -> Result<f64> {
        let media = self.media()?;
        Ok(media.audio.as_ref().map_or(0.0, |audio| audio.position()))
    }

    /**
        Read the next frame as packed RGB at the native size.

        Returns `Ok(None)` at the end of the stream. A frame that fails to
        decode is reported as an error, after which reading can continue.

        Audio packets met on the way are queued for
        [`VideoFileReader::read_audio_frame`]. If audio is never read they
        pile up for the whole file, unless audio is turned off with
        [`ReaderConfig::without_audio`] or the queue is bounded with
        [`ReaderConfig::with_packet_queue_limit`].
    */
    pub fn read_video_frame(&mut self) -> Result<Option<VideoFrame>> {
        self.read_video_frame_as(OutputFormat::Rgb24, None)
    }

    /**
        Read the next frame as packed RGB, resized to `width` x `height`.
    */
    pub fn read_video_frame_scaled(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<Option<VideoFrame>> {
        self.read_video_frame_as(OutputFormat::Rgb24, Some((width, height)))
    }

    /**
        Read the next frame as grayscale at the native size.
    */
    pub fn read_video_frame_gray(&mut self) -> Result<Option<VideoFrame>> {
        self.read_video_frame_as(OutputFormat::Gray8, None)
    }

    /**
        Read the next frame as grayscale, resized to `width` x `height`.
    */
    pub fn read_video_frame_gray_scaled(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<Option<VideoFrame>> {
        self.read_video_frame_as(OutputFormat::Gray8, Some((width, height)))
    }

    /**
        Read the next frame in the given format, optionally resized.

        Fails with [`ReaderError::InvalidArgument`] if a requested
        dimension is zero.
    */
    pub fn read_video_frame_as(
        &mut self,
        format: OutputFormat,
        size: Option<(u32, u32)>,
    ) -> Result<Option<VideoFrame>> {
        let media = self.media_mut()?;
        media.video.read_frame(&mut media.context, format, size)
    }

    /**
        Read decoded audio.

        With `only_current_video_frame` set, returns the audio starting at
        or before the last video frame read, and `Ok(None)` if there is
        none left to catch up on. Otherwise returns the next decoded audio
        regardless of the video position.

        Always `Ok(None)` for files without audio.
    */
    pub fn read_audio_frame(&mut self, only_current_video_frame: bool) -> Result<Option<AudioChunk>> {
        let media = self.media_mut()?;
        let limit = only_current_video_frame.then(|| media.video.position());
        match media.audio.as_mut() {
            Some(audio) => audio.read_chunk(&mut media.context, limit),
            None => Ok(None),
        }
    }

    /**
        Seek to the frame time `seconds`, on the same timeline as
        [`VideoFileReader::start_time`] and the frame timestamps.

        With `seek_key_frame` set, lands on the closest keyframe at or
        before the target, which is fast but may be well before it.
        Otherwise decodes forward to the first frame at or after the
        target. Returns the timestamp of the frame the next video read
        will return; both current times are set to it.
    */
    pub fn seek(&mut self, seconds: f64, seek_key_frame: bool) -> Result<f64> {
        let OpenMedia {
            context,
            video,
            audio,
            seek,
            ..
        } = self.media_mut()?;
        seek.seek(context, video, audio.as_mut(), seconds, seek_key_frame)
    }

    /**
        Seek to the closest keyframe at or before `seconds`.

        Shorthand for `seek(seconds, true)`.
    */
    pub fn seek_key_frame(&mut self, seconds: f64) -> Result<f64> {
        self.seek(seconds, true)
    }

    fn media(&self) -> Result<&OpenMedia<B>> {
        self.state.as_ref().ok_or(ReaderError::NotOpen)
    }

    fn media_mut(&mut self) -> Result<&mut OpenMedia<B>> {
        self.state.as_mut().ok_or(ReaderError::NotOpen)
    }
}

impl<B: MediaBackend> Drop for VideoFileReader<B> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<B: MediaBackend> std::fmt::Debug for VideoFileReader<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoFileReader")
            .field("config", &self.config)
            .field("path", &self.state.as_ref().map(|media| &media.path))
            .finish_non_exhaustive()
    }
}
