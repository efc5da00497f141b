/*!
    Seeking, with optional fast-forward to the exact frame.
*/

use log::{debug, trace, warn};

use ffmpeg_types::{AudioFrame, VideoFrame};

use crate::audio::AudioPipeline;
use crate::backend::{FrameConverter, FrameDecoder, PacketSource};
use crate::context::MediaContext;
use crate::error::{ReaderError, Result};
use crate::video::VideoPipeline;

/// A frame this close before the target counts as being at the target.
const SEEK_TOLERANCE: f64 = 1e-6;

/**
    Moves an open file to a new position and resynchronizes both pipelines.
*/
pub(crate) struct SeekController {
    start: f64,
    end: Option<f64>,
}

impl SeekController {
    /**
        Create a controller for a file whose timestamps run from `start`
        to `end` seconds. Targets past the end, if known, are rejected.

        Targets are on the same timeline as frame timestamps, so any time
        reported by the reader can be sought back to.
    */
    pub fn new(start: f64, end: Option<f64>) -> Self {
        Self { start, end }
    }

    /**
        Seek to `target` seconds, returning the timestamp of the frame the
        next video read will return.

        Containers can only seek to keyframes, so the source lands on the
        closest keyframe at or before the target. With `key_frame` set that
        keyframe is the result. Otherwise frames are decoded and dropped
        until one reaches the target.
    */
    pub fn seek<S, VD, C, AD>(
        &self,
        context: &mut MediaContext<S>,
        video: &mut VideoPipeline<VD, C>,
        mut audio: Option<&mut AudioPipeline<AD>>,
        target: f64,
        key_frame: bool,
    ) -> Result<f64>
    where
        S: PacketSource,
        VD: FrameDecoder<Frame = VideoFrame>,
        C: FrameConverter,
        AD: FrameDecoder<Frame = AudioFrame>,
    {
        self.validate(target)?;
        debug!(
            "[reader] seeking to {target:.3}s ({})",
            if key_frame { "keyframe" } else { "exact" }
        );

        context.seek(target).map_err(ReaderError::seek)?;
        video.reset(target);
        if let Some(audio) = audio.as_deref_mut() {
            audio.reset(target);
        }

        let landing = loop {
            match video.next_frame(context) {
                Ok(Some(decoded)) if key_frame || decoded.timestamp >= target - SEEK_TOLERANCE => {
                    break decoded;
                }
                Ok(Some(decoded)) => {
                    trace!("[reader] skipping frame at {:.3}s", decoded.timestamp);
                }
                Ok(None) => {
                    return Err(ReaderError::Seek(format!(
                        "stream ended before reaching {target:.3}s"
                    )));
                }
                Err(e) => warn!("[reader] skipping undecodable frame while seeking: {e}"),
            }
        };

        let timestamp = landing.timestamp;
        video.requeue_front(landing);
        video.set_position(timestamp);

        if let Some(audio) = audio {
            audio.set_position(timestamp);
            context.discard_audio_before(timestamp);
        }

        debug!("[reader] seek to {target:.3}s landed at {timestamp:.3}s");
        Ok(timestamp)
    }

    fn validate(&self, target: f64) -> Result<()> {
        // Edit lists can put the first frame slightly before zero
        if !target.is_finite() || target < self.start.min(0.0) {
            return Err(ReaderError::Seek(format!(
                "target {target} is not a valid position"
            )));
        }
        if let Some(end) = self.end {
            if target > end + SEEK_TOLERANCE {
                return Err(ReaderError::Seek(format!(
                    "target {target:.3}s is past the end ({end:.3}s)"
                )));
            }
        }
        Ok(())
    }
}
