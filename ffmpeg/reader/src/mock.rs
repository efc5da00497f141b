/*!
    Scripted backend for driving the reader without FFmpeg.

    Video packet `i` has timestamp `i / 10` and decodes to a frame filled
    with the byte `i`. Audio packet `i` starts at the same time and holds
    800 mono S16 samples at 8 kHz, 0.1 seconds worth.
*/

use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use ffmpeg_types::{
    AudioFrame, AudioStreamInfo, ChannelLayout, Error, MediaDuration, MediaInfo, Packet,
    PixelFormat, Pts, Rational, Result, SampleFormat, StreamType, VideoFrame, VideoStreamInfo,
};

use crate::backend::{FrameConverter, FrameDecoder, MediaBackend, OpenedMedia, PacketSource};
use crate::config::ReaderConfig;
use crate::error::ReaderError;

pub(crate) const WIDTH: u32 = 8;
pub(crate) const HEIGHT: u32 = 6;
pub(crate) const MISSING: &str = "missing.mock";

const VIDEO_TIME_BASE: Rational = Rational { num: 1, den: 10 };
const AUDIO_TIME_BASE: Rational = Rational { num: 1, den: 8000 };
const KEYFRAME_INTERVAL: i64 = 10;
const CORRUPT: &[u8] = b"corrupt";

pub(crate) fn video_packet(index: i64, keyframe: bool) -> Packet {
    Packet::new(
        vec![index as u8],
        Some(Pts(index)),
        Some(Pts(index)),
        MediaDuration(1),
        VIDEO_TIME_BASE,
        keyframe,
        StreamType::Video,
    )
}

pub(crate) fn audio_packet(index: i64) -> Packet {
    Packet::new(
        vec![index as u8; 1600],
        Some(Pts(index * 800)),
        Some(Pts(index * 800)),
        MediaDuration(800),
        AUDIO_TIME_BASE,
        true,
        StreamType::Audio,
    )
}

/**
    Packets of `frames` video frames, each preceded by its audio packet.
*/
pub(crate) fn interleaved(frames: i64, with_audio: bool) -> Vec<Packet> {
    interleaved_from(0, frames, with_audio)
}

/**
    Like [`interleaved`], with the first frame at index `first` instead of
    zero, as in containers whose timestamps do not start at zero.
*/
pub(crate) fn interleaved_from(first: i64, frames: i64, with_audio: bool) -> Vec<Packet> {
    let mut packets = Vec::new();
    for index in first..first + frames {
        if with_audio {
            packets.push(audio_packet(index));
        }
        packets.push(video_packet(index, (index - first) % KEYFRAME_INTERVAL == 0));
    }
    packets
}

/**
    Make a packet fail to decode.
*/
pub(crate) fn corrupt(packet: &mut Packet) {
    packet.data = CORRUPT.to_vec();
}

pub(crate) struct MockSource {
    packets: Vec<Packet>,
    cursor: usize,
}

impl MockSource {
    pub fn new(packets: Vec<Packet>) -> Self {
        Self { packets, cursor: 0 }
    }
}

impl PacketSource for MockSource {
    fn next_packet(&mut self) -> Result<Option<Packet>> {
        let packet = self.packets.get(self.cursor).cloned();
        if packet.is_some() {
            self.cursor += 1;
        }
        Ok(packet)
    }

    fn seek(&mut self, seconds: f64) -> Result<()> {
        let keyframe = self
            .packets
            .iter()
            .filter(|p| p.is_video() && p.is_keyframe)
            .filter_map(Packet::timestamp)
            .filter(|&t| t <= seconds)
            .fold(0.0, f64::max);
        self.cursor = self
            .packets
            .iter()
            .position(|p| p.timestamp().is_some_and(|t| t >= keyframe))
            .unwrap_or(self.packets.len());
        Ok(())
    }
}

/**
    Decodes one frame per packet, holding back `delay` frames until flushed.
*/
pub(crate) struct MockVideoDecoder {
    delay: usize,
    pending: VecDeque<VideoFrame>,
}

impl MockVideoDecoder {
    pub fn new(delay: usize) -> Self {
        Self {
            delay,
            pending: VecDeque::new(),
        }
    }
}

impl FrameDecoder for MockVideoDecoder {
    type Frame = VideoFrame;

    fn decode(&mut self, packet: &Packet) -> Result<Vec<VideoFrame>> {
        if packet.data == CORRUPT {
            return Err(Error::codec("corrupt video packet"));
        }
        self.pending.push_back(VideoFrame::new(
            vec![packet.data[0]; PixelFormat::Bgr24.buffer_size(WIDTH, HEIGHT)],
            WIDTH,
            HEIGHT,
            PixelFormat::Bgr24,
            packet.pts,
            packet.time_base,
        ));

        let ready = self.pending.len().saturating_sub(self.delay);
        Ok(self.pending.drain(..ready).collect())
    }

    fn flush(&mut self) -> Result<Vec<VideoFrame>> {
        Ok(self.pending.drain(..).collect())
    }

    fn reset(&mut self) {
        self.pending.clear();
    }
}

pub(crate) struct MockAudioDecoder;

impl FrameDecoder for MockAudioDecoder {
    type Frame = AudioFrame;

    fn decode(&mut self, packet: &Packet) -> Result<Vec<AudioFrame>> {
        if packet.data == CORRUPT {
            return Err(Error::codec("corrupt audio packet"));
        }
        Ok(vec![AudioFrame::new(
            packet.data.clone(),
            packet.data.len() / 2,
            8000,
            ChannelLayout::Mono,
            SampleFormat::S16,
            packet.pts,
            packet.time_base,
        )])
    }

    fn flush(&mut self) -> Result<Vec<AudioFrame>> {
        Ok(Vec::new())
    }

    fn reset(&mut self) {}
}

/**
    Wraps a decoder and strips the timestamps of everything it outputs.
*/
pub(crate) struct Untimed<D>(pub D);

impl FrameDecoder for Untimed<MockVideoDecoder> {
    type Frame = VideoFrame;

    fn decode(&mut self, packet: &Packet) -> Result<Vec<VideoFrame>> {
        self.0.decode(packet).map(strip_video)
    }

    fn flush(&mut self) -> Result<Vec<VideoFrame>> {
        self.0.flush().map(strip_video)
    }

    fn reset(&mut self) {
        self.0.reset();
    }
}

impl FrameDecoder for Untimed<MockAudioDecoder> {
    type Frame = AudioFrame;

    fn decode(&mut self, packet: &Packet) -> Result<Vec<AudioFrame>> {
        let mut frames = self.0.decode(packet)?;
        for frame in &mut frames {
            frame.pts = None;
        }
        Ok(frames)
    }

    fn flush(&mut self) -> Result<Vec<AudioFrame>> {
        self.0.flush()
    }

    fn reset(&mut self) {
        self.0.reset();
    }
}

fn strip_video(mut frames: Vec<VideoFrame>) -> Vec<VideoFrame> {
    for frame in &mut frames {
        frame.pts = None;
    }
    frames
}

/**
    Fills the output with the first byte of the input, at any size.
*/
pub(crate) struct MockConverter;

impl FrameConverter for MockConverter {
    fn convert(
        &mut self,
        frame: &VideoFrame,
        format: PixelFormat,
        width: u32,
        height: u32,
    ) -> Result<VideoFrame> {
        let value = frame.data.first().copied().unwrap_or_default();
        Ok(VideoFrame::new(
            vec![value; format.buffer_size(width, height)],
            width,
            height,
            format,
            frame.pts,
            frame.time_base,
        ))
    }
}

#[derive(Clone)]
pub(crate) struct MockBackend {
    packets: Vec<Packet>,
    start_time: f64,
    video_delay: usize,
    audio: bool,
}

impl MockBackend {
    /**
        A file with `frames` video frames and matching audio.
    */
    pub fn new(frames: i64) -> Self {
        Self {
            packets: interleaved(frames, true),
            start_time: 0.0,
            video_delay: 0,
            audio: true,
        }
    }

    /**
        A file with `frames` video frames, the first one at `first / 10`
        seconds.
    */
    pub fn starting_at_frame(first: i64, frames: i64) -> Self {
        Self {
            packets: interleaved_from(first, frames, true),
            start_time: first as f64 / 10.0,
            ..Self::new(frames)
        }
    }

    pub fn without_audio(mut self) -> Self {
        self.packets.retain(Packet::is_video);
        self.audio = false;
        self
    }

    pub fn with_video_delay(mut self, delay: usize) -> Self {
        self.video_delay = delay;
        self
    }

    pub fn with_corrupt(mut self, stream_type: StreamType, index: usize) -> Self {
        if let Some(packet) = self
            .packets
            .iter_mut()
            .filter(|p| p.stream_type == stream_type)
            .nth(index)
        {
            corrupt(packet);
        }
        self
    }

    fn frames(&self) -> u64 {
        self.packets.iter().filter(|p| p.is_video()).count() as u64
    }
}

impl MediaBackend for MockBackend {
    type Source = MockSource;
    type VideoDecoder = MockVideoDecoder;
    type AudioDecoder = MockAudioDecoder;
    type Converter = MockConverter;

    fn open(
        &self,
        path: &Path,
        config: &ReaderConfig,
    ) -> std::result::Result<OpenedMedia<Self>, ReaderError> {
        if path == Path::new(MISSING) {
            return Err(ReaderError::NotFound(path.to_path_buf()));
        }

        let duration = Duration::from_millis(self.frames() * 100);
        let info = MediaInfo {
            format_name: "mock".into(),
            start_time: self.start_time,
            duration: Some(duration),
            video: Some(VideoStreamInfo {
                index: 0,
                width: WIDTH,
                height: HEIGHT,
                frame_rate: Some(Rational::new(10, 1)),
                time_base: VIDEO_TIME_BASE,
                frame_count: Some(self.frames()),
                duration: Some(duration),
                codec_name: "mockvideo".into(),
            }),
            audio: self.audio.then(|| AudioStreamInfo {
                index: 1,
                sample_rate: 8000,
                channels: 1,
                time_base: AUDIO_TIME_BASE,
                duration: Some(duration),
                codec_name: "mockaudio".into(),
            }),
        };

        Ok(OpenedMedia {
            info,
            source: MockSource::new(self.packets.clone()),
            video: MockVideoDecoder::new(self.video_delay),
            audio: (self.audio && config.decode_audio).then_some(MockAudioDecoder),
            converter: MockConverter,
        })
    }
}
