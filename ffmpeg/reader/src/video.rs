/*!
    Video decode pipeline.
*/

use std::collections::VecDeque;

use log::debug;

use ffmpeg_types::{Pts, StreamType, VideoFrame};

use crate::backend::{FrameConverter, FrameDecoder, PacketSource};
use crate::config::OutputFormat;
use crate::context::MediaContext;
use crate::error::{ReaderError, Result};

/**
    A decoded frame in decoder format, with its presentation time.
*/
pub(crate) struct Decoded {
    pub frame: VideoFrame,
    pub timestamp: f64,
}

/**
    Pulls video packets, decodes them and converts the frames for output.

    Color and grayscale reads share everything except the final
    conversion, selected by [`OutputFormat`].
*/
pub(crate) struct VideoPipeline<D, C> {
    decoder: D,
    converter: C,
    ready: VecDeque<Decoded>,
    drained: bool,
    position: f64,
    timeline: Timeline,
    frame_duration: Option<f64>,
}

/**
    Where frames without a timestamp are placed.

    An untimed frame follows the last timed frame by whole frame durations.
    Before any frame was timed, it falls back to the first packet fed to
    the decoder, then to `origin`.
*/
#[derive(Debug, Default)]
struct Timeline {
    origin: f64,
    first_packet: Option<f64>,
    anchor: Option<f64>,
    untimed: u32,
}

impl Timeline {
    fn restart(&mut self, origin: f64) {
        *self = Self {
            origin,
            ..Self::default()
        };
    }

    fn timed(&mut self, timestamp: f64) {
        self.anchor = Some(timestamp);
        self.untimed = 0;
    }

    fn untimed(&mut self, frame_duration: f64) -> f64 {
        match self.anchor {
            Some(anchor) => {
                self.untimed += 1;
                anchor + f64::from(self.untimed) * frame_duration
            }
            None => {
                let anchor = self.first_packet.unwrap_or(self.origin);
                self.timed(anchor);
                anchor
            }
        }
    }
}

impl<D, C> VideoPipeline<D, C>
where
    D: FrameDecoder<Frame = VideoFrame>,
    C: FrameConverter,
{
    /**
        Create a pipeline. `frame_duration` is used to time frames that
        come out of the decoder without a timestamp.
    */
    pub fn new(decoder: D, converter: C, frame_duration: Option<f64>) -> Self {
        Self {
            decoder,
            converter,
            ready: VecDeque::new(),
            drained: false,
            position: 0.0,
            timeline: Timeline::default(),
            frame_duration,
        }
    }

    /**
        Start the clock at `seconds` instead of zero, for files whose
        first frame is not at zero.
    */
    pub fn starting_at(mut self, seconds: f64) -> Self {
        self.position = seconds;
        self.timeline.restart(seconds);
        self
    }

    /**
        Presentation time of the last frame handed out, in seconds.
    */
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn set_position(&mut self, seconds: f64) {
        self.position = seconds;
    }

    /**
        Read the next frame, converted to `format` and optionally resized.

        Returns `Ok(None)` at the end of the stream, and keeps doing so
        until the next seek.
    */
    pub fn read_frame<S: PacketSource>(
        &mut self,
        context: &mut MediaContext<S>,
        format: OutputFormat,
        size: Option<(u32, u32)>,
    ) -> Result<Option<VideoFrame>> {
        if let Some((width, height)) = size {
            if width == 0 || height == 0 {
                return Err(ReaderError::InvalidArgument(format!(
                    "target size {width}x{height} must be positive"
                )));
            }
        }

        let Some(Decoded { frame, timestamp }) = self.next_frame(context)? else {
            return Ok(None);
        };

        let (width, height) = size.unwrap_or((frame.width, frame.height));
        let output = self
            .converter
            .convert(&frame, format.pixel_format(), width, height)
            .map_err(ReaderError::decode)?;

        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if output.data.len() != expected {
            return Err(ReaderError::Decode(format!(
                "converted frame holds {} bytes, expected {expected}",
                output.data.len()
            )));
        }

        self.position = self.position.max(timestamp);
        Ok(Some(output))
    }

    /**
        Next decoded frame, before conversion.

        A packet that fails to decode is consumed and its error returned;
        the following call carries on with the next packet.
    */
    pub fn next_frame<S: PacketSource>(
        &mut self,
        context: &mut MediaContext<S>,
    ) -> Result<Option<Decoded>> {
        loop {
            if let Some(decoded) = self.ready.pop_front() {
                return Ok(Some(decoded));
            }
            if self.drained {
                return Ok(None);
            }

            let frames = match context
                .next_packet(StreamType::Video)
                .map_err(ReaderError::decode)?
            {
                Some(packet) => {
                    if self.timeline.first_packet.is_none() {
                        self.timeline.first_packet = packet.timestamp();
                    }
                    self.decoder.decode(&packet)
                }
                None => {
                    self.drained = true;
                    self.decoder.flush().inspect(|frames| {
                        debug!("[reader] video drained, {} frames flushed", frames.len());
                    })
                }
            }
            .map_err(ReaderError::decode)?;

            for frame in frames {
                let decoded = self.stamp(frame);
                self.ready.push_back(decoded);
            }
        }
    }

    /**
        Put a decoded frame back, to be returned by the next read.
    */
    pub fn requeue_front(&mut self, decoded: Decoded) {
        self.ready.push_front(decoded);
    }

    /**
        Drop decoder state and buffered frames after a seek to `target`.
    */
    pub fn reset(&mut self, target: f64) {
        self.decoder.reset();
        self.ready.clear();
        self.drained = false;
        self.timeline.restart(target);
    }

    fn stamp(&mut self, mut frame: VideoFrame) -> Decoded {
        if let Some(timestamp) = frame.timestamp() {
            self.timeline.timed(timestamp);
            return Decoded { frame, timestamp };
        }

        let estimate = self.timeline.untimed(self.frame_duration.unwrap_or(0.0));
        let pts = Pts::from_seconds(estimate, frame.time_base);
        frame.pts = Some(pts);
        Decoded {
            timestamp: pts.to_seconds(frame.time_base),
            frame,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{
        HEIGHT, MockConverter, MockSource, MockVideoDecoder, Untimed, WIDTH, interleaved,
    };
    use ffmpeg_types::{PixelFormat, Rational};

    fn pipeline() -> (
        MediaContext<MockSource>,
        VideoPipeline<MockVideoDecoder, MockConverter>,
    ) {
        let context = MediaContext::new(MockSource::new(interleaved(5, false)), false, None);
        let pipeline = VideoPipeline::new(MockVideoDecoder::new(0), MockConverter, Some(0.1));
        (context, pipeline)
    }

    #[test]
    fn native_size_by_default() {
        let (mut ctx, mut video) = pipeline();
        let frame = video
            .read_frame(&mut ctx, OutputFormat::Rgb24, None)
            .unwrap()
            .unwrap();
        assert_eq!((frame.width, frame.height), (WIDTH, HEIGHT));
        assert_eq!(frame.format, PixelFormat::Rgb24);
        assert_eq!(frame.data.len(), (WIDTH * HEIGHT * 3) as usize);
    }

    #[test]
    fn zero_size_is_invalid() {
        let (mut ctx, mut video) = pipeline();
        let result = video.read_frame(&mut ctx, OutputFormat::Gray8, Some((0, 4)));
        assert!(matches!(result, Err(ReaderError::InvalidArgument(_))));
        // Nothing was consumed
        let frame = video
            .read_frame(&mut ctx, OutputFormat::Gray8, Some((4, 4)))
            .unwrap()
            .unwrap();
        assert_eq!(frame.data, vec![0; 16]);
    }

    #[test]
    fn frames_without_timestamps_follow_the_previous_one() {
        let (_, mut video) = pipeline();
        let frame = |pts| {
            VideoFrame::new(
                vec![0; 3],
                1,
                1,
                PixelFormat::Rgb24,
                pts,
                Rational::new(1, 10),
            )
        };

        assert_eq!(video.stamp(frame(None)).timestamp, 0.0);
        assert_eq!(video.stamp(frame(Some(Pts(5)))).timestamp, 0.5);

        let decoded = video.stamp(frame(None));
        assert_eq!(decoded.timestamp, 0.6);
        assert_eq!(decoded.frame.pts, Some(Pts(6)));
    }

    #[test]
    fn requeued_frame_comes_first() {
        let (mut ctx, mut video) = pipeline();
        let first = video.next_frame(&mut ctx).unwrap().unwrap();
        assert_eq!(first.timestamp, 0.0);
        video.requeue_front(first);

        let frame = video
            .read_frame(&mut ctx, OutputFormat::Gray8, None)
            .unwrap()
            .unwrap();
        assert_eq!(frame.data[0], 0);
        assert_eq!(video.position(), 0.0);

        let frame = video
            .read_frame(&mut ctx, OutputFormat::Gray8, None)
            .unwrap()
            .unwrap();
        assert_eq!(frame.data[0], 1);
        assert_eq!(video.position(), 0.1);
    }

    #[test]
    fn untimed_frames_after_a_seek_start_at_the_first_packet() {
        let mut ctx = MediaContext::new(MockSource::new(interleaved(30, false)), false, None);
        let mut video =
            VideoPipeline::new(Untimed(MockVideoDecoder::new(0)), MockConverter, Some(0.1));

        ctx.seek(1.55).unwrap();
        video.reset(1.55);

        let first = video.next_frame(&mut ctx).unwrap().unwrap();
        assert_eq!(first.timestamp, 1.0);
        assert_eq!(first.frame.data[0], 10);
        let second = video.next_frame(&mut ctx).unwrap().unwrap();
        assert_eq!(second.timestamp, 1.1);
        assert_eq!(second.frame.pts, Some(Pts(11)));
    }

    #[test]
    fn untimed_frames_fall_back_to_the_start_time() {
        let (_, video) = pipeline();
        let mut video = video.starting_at(4.0);
        assert_eq!(video.position(), 4.0);

        let frame = VideoFrame::new(
            vec![0; 3],
            1,
            1,
            PixelFormat::Rgb24,
            None,
            Rational::new(1, 10),
        );
        assert_eq!(video.stamp(frame.clone()).timestamp, 4.0);
        assert_eq!(video.stamp(frame).timestamp, 4.1);
    }

    struct TruncatingConverter;

    impl FrameConverter for TruncatingConverter {
        fn convert(
            &mut self,
            frame: &VideoFrame,
            format: PixelFormat,
            width: u32,
            height: u32,
        ) -> ffmpeg_types::Result<VideoFrame> {
            let mut output = MockConverter.convert(frame, format, width, height)?;
            output.data.pop();
            Ok(output)
        }
    }

    #[test]
    fn short_converter_output_is_an_error() {
        let mut ctx = MediaContext::new(MockSource::new(interleaved(5, false)), false, None);
        let mut video = VideoPipeline::new(MockVideoDecoder::new(0), TruncatingConverter, Some(0.1));

        let result = video.read_frame(&mut ctx, OutputFormat::Gray8, Some((4, 4)));
        assert!(matches!(result, Err(ReaderError::Decode(_))));
        assert_eq!(video.position(), 0.0);
    }
}
