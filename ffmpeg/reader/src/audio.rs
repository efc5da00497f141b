/*!
    Audio decode pipeline.
*/

use std::collections::VecDeque;

use log::trace;

use ffmpeg_types::{AudioFrame, ChannelLayout, Packet, SampleFormat, StreamType};

use crate::backend::{FrameDecoder, PacketSource};
use crate::context::MediaContext;
use crate::error::{ReaderError, Result};

/**
    A run of decoded audio handed out by the reader.

    Samples are interleaved in `format`, `samples` per channel.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct AudioChunk {
    /// Interleaved sample data.
    pub data: Vec<u8>,
    /// Presentation time of the first sample, in seconds.
    pub start: f64,
    /// Presentation time just after the last sample, in seconds.
    pub end: f64,
    /// Number of samples per channel.
    pub samples: usize,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel layout.
    pub channels: ChannelLayout,
    /// Sample format.
    pub format: SampleFormat,
}

impl AudioChunk {
    /**
        Length of the chunk in seconds.
    */
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

struct Timed {
    frame: AudioFrame,
    start: f64,
}

/**
    Pulls audio packets and decodes them, optionally gated by the
    position of the video pipeline.
*/
pub(crate) struct AudioPipeline<D> {
    decoder: D,
    ready: VecDeque<Timed>,
    drained: bool,
    position: f64,
    origin: f64,
    next_start: Option<f64>,
}

impl<D> AudioPipeline<D>
where
    D: FrameDecoder<Frame = AudioFrame>,
{
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            ready: VecDeque::new(),
            drained: false,
            position: 0.0,
            origin: 0.0,
            next_start: None,
        }
    }

    /**
        Start the clock at `seconds` instead of zero, for files whose
        first frame is not at zero.
    */
    pub fn starting_at(mut self, seconds: f64) -> Self {
        self.position = seconds;
        self.origin = seconds;
        self
    }

    /**
        Start time of the latest audio frame handed out, in seconds.
    */
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn set_position(&mut self, seconds: f64) {
        self.position = seconds;
    }

    /**
        Read the next chunk of audio.

        With a `limit`, collects every frame starting at or before it and
        stops at the first packet beyond, which stays queued for a later
        call. Returns `Ok(None)` when nothing is due yet.

        Without a limit, returns the frames of the next packet that
        produces any.

        If decoding fails, frames collected so far are kept for the next
        call and the error is returned.
    */
    pub fn read_chunk<S: PacketSource>(
        &mut self,
        context: &mut MediaContext<S>,
        limit: Option<f64>,
    ) -> Result<Option<AudioChunk>> {
        let mut frames = Vec::new();
        let collected = match limit {
            Some(limit) => self.collect_until(context, limit, &mut frames),
            None => self.collect_next(context, &mut frames),
        };

        if let Err(e) = collected {
            for timed in frames.into_iter().rev() {
                self.ready.push_front(timed);
            }
            return Err(e);
        }

        Ok(self.assemble(frames))
    }

    /**
        Drop decoder state and buffered frames after a seek to `target`.
    */
    pub fn reset(&mut self, target: f64) {
        self.decoder.reset();
        self.ready.clear();
        self.drained = false;
        self.origin = target;
        self.next_start = None;
    }

    fn collect_until<S: PacketSource>(
        &mut self,
        context: &mut MediaContext<S>,
        limit: f64,
        frames: &mut Vec<Timed>,
    ) -> Result<()> {
        loop {
            if self.take_ready(frames, Some(limit)) || self.drained {
                return Ok(());
            }

            match context
                .next_packet(StreamType::Audio)
                .map_err(ReaderError::decode)?
            {
                Some(packet) if packet.timestamp().is_some_and(|t| t > limit) => {
                    trace!(
                        "[reader] audio packet at {:?}s is past {limit:.3}s",
                        packet.timestamp()
                    );
                    context.unread(packet);
                    return Ok(());
                }
                Some(packet) => {
                    self.decode(&packet)?;
                }
                None => self.drain()?,
            }
        }
    }

    fn collect_next<S: PacketSource>(
        &mut self,
        context: &mut MediaContext<S>,
        frames: &mut Vec<Timed>,
    ) -> Result<()> {
        loop {
            if !self.ready.is_empty() {
                self.take_ready(frames, None);
                return Ok(());
            }
            if self.drained {
                return Ok(());
            }

            match context
                .next_packet(StreamType::Audio)
                .map_err(ReaderError::decode)?
            {
                Some(packet) => {
                    self.decode(&packet)?;
                }
                None => self.drain()?,
            }
        }
    }

    fn decode(&mut self, packet: &Packet) -> Result<()> {
        // Untimed frames count on from the first packet after a reset
        if self.next_start.is_none() {
            self.next_start = packet.timestamp();
        }
        let decoded = self.decoder.decode(packet).map_err(ReaderError::decode)?;
        self.push(decoded);
        Ok(())
    }

    fn drain(&mut self) -> Result<()> {
        self.drained = true;
        let decoded = self.decoder.flush().map_err(ReaderError::decode)?;
        self.push(decoded);
        Ok(())
    }

    /**
        Move due frames from the ready queue into `frames`.

        Returns true if a frame was left behind, either because it starts
        after `limit` or because its layout differs from the frames taken.
    */
    fn take_ready(&mut self, frames: &mut Vec<Timed>, limit: Option<f64>) -> bool {
        while let Some(next) = self.ready.front() {
            if limit.is_some_and(|limit| next.start > limit) {
                return true;
            }
            if frames
                .first()
                .is_some_and(|first| !same_layout(&first.frame, &next.frame))
            {
                return true;
            }
            if let Some(timed) = self.ready.pop_front() {
                frames.push(timed);
            }
        }
        false
    }

    fn push(&mut self, frames: Vec<AudioFrame>) {
        for frame in frames {
            let start = frame
                .timestamp()
                .unwrap_or_else(|| self.next_start.unwrap_or(self.origin));
            self.next_start = Some(start + frame.duration_seconds());
            self.ready.push_back(Timed { frame, start });
        }
    }

    fn assemble(&mut self, frames: Vec<Timed>) -> Option<AudioChunk> {
        let first = frames.first()?;
        let last = frames.last()?;

        let start = first.start;
        let last_start = last.start;
        let end = last.start + last.frame.duration_seconds();
        let sample_rate = first.frame.sample_rate;
        let channels = first.frame.channels;
        let format = first.frame.format;

        let samples = frames.iter().map(|t| t.frame.samples).sum();
        let mut data = Vec::with_capacity(frames.iter().map(|t| t.frame.data.len()).sum());
        for timed in frames {
            data.extend_from_slice(&timed.frame.data);
        }

        self.position = self.position.max(last_start);
        Some(AudioChunk {
            data,
            start,
            end,
            samples,
            sample_rate,
            channels,
            format,
        })
    }
}

fn same_layout(a: &AudioFrame, b: &AudioFrame) -> bool {
    a.format == b.format && a.sample_rate == b.sample_rate && a.channels == b.channels
}
