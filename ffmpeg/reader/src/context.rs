/*!
    The open media context and its cross-stream packet queues.
*/

use std::collections::VecDeque;

use log::{debug, trace, warn};

use ffmpeg_types::{Packet, Result, StreamType};

use crate::backend::PacketSource;

/**
    Owns the packet source of an open file and routes its packets.

    Containers interleave streams, so reading the next video packet often
    means reading audio packets first. Those are queued for the audio
    pipeline instead of being thrown away, and the other way around.
*/
pub(crate) struct MediaContext<S> {
    source: S,
    video_queue: VecDeque<Packet>,
    audio_queue: VecDeque<Packet>,
    route_audio: bool,
    queue_limit: Option<usize>,
    exhausted: bool,
}

impl<S: PacketSource> MediaContext<S> {
    /**
        Wrap a source. Audio packets are only kept when `route_audio` is
        set, i.e. when something will decode them.
    */
    pub fn new(source: S, route_audio: bool, queue_limit: Option<usize>) -> Self {
        Self {
            source,
            video_queue: VecDeque::new(),
            audio_queue: VecDeque::new(),
            route_audio,
            queue_limit,
            exhausted: false,
        }
    }

    /**
        Next packet of the given stream, or `None` once the source is
        exhausted and nothing is queued for that stream.
    */
    pub fn next_packet(&mut self, stream_type: StreamType) -> Result<Option<Packet>> {
        if let Some(packet) = self.queue_mut(stream_type).pop_front() {
            return Ok(Some(packet));
        }

        while !self.exhausted {
            let Some(packet) = self.source.next_packet()? else {
                debug!("[reader] packet source exhausted");
                self.exhausted = true;
                break;
            };
            if packet.stream_type == stream_type {
                return Ok(Some(packet));
            }
            self.enqueue(packet);
        }

        Ok(None)
    }

    /**
        Put a packet back at the front of its queue, to be returned by the
        next call to [`MediaContext::next_packet`] for its stream.
    */
    pub fn unread(&mut self, packet: Packet) {
        self.queue_mut(packet.stream_type).push_front(packet);
    }

    /**
        Seek the source and drop everything queued from the old position.
    */
    pub fn seek(&mut self, seconds: f64) -> Result<()> {
        self.source.seek(seconds)?;
        self.video_queue.clear();
        self.audio_queue.clear();
        self.exhausted = false;
        Ok(())
    }

    /**
        Drop queued audio packets that end at or before `seconds`.

        Packets without a timestamp are kept, since their age is unknown.
    */
    pub fn discard_audio_before(&mut self, seconds: f64) -> usize {
        let before = self.audio_queue.len();
        self.audio_queue.retain(|packet| {
            packet
                .timestamp()
                .is_none_or(|start| start + packet.duration_seconds() > seconds + STALE_TOLERANCE)
        });
        let dropped = before - self.audio_queue.len();
        if dropped > 0 {
            trace!("[reader] dropped {dropped} stale audio packets before {seconds:.3}s");
        }
        dropped
    }

    #[cfg(test)]
    pub fn queued(&self, stream_type: StreamType) -> usize {
        match stream_type {
            StreamType::Video => self.video_queue.len(),
            StreamType::Audio => self.audio_queue.len(),
        }
    }

    fn enqueue(&mut self, packet: Packet) {
        if packet.is_audio() && !self.route_audio {
            trace!("[reader] dropping audio packet, audio is not decoded");
            return;
        }

        let limit = self.queue_limit;
        let stream_type = packet.stream_type;
        let queue = self.queue_mut(stream_type);
        queue.push_back(packet);

        if let Some(limit) = limit {
            if queue.len() > limit {
                queue.pop_front();
                warn!(
                    "[reader] {} packet queue is full ({limit}), dropped the oldest packet",
                    stream_type.name()
                );
            }
        }
    }

    fn queue_mut(&mut self, stream_type: StreamType) -> &mut VecDeque<Packet> {
        match stream_type {
            StreamType::Video => &mut self.video_queue,
            StreamType::Audio => &mut self.audio_queue,
        }
    }
}

// Audio ending this close to a seek target counts as already played
const STALE_TOLERANCE: f64 = 1e-6;
