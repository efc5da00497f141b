/*!
    Decoder configuration types.
*/

/**
    Configuration for video decoder.
*/
#[derive(Clone, Debug, Default)]
pub struct VideoDecoderConfig {
    /**
        Number of decoding threads.

        `None` lets FFmpeg pick based on the number of CPUs. Frame
        threading adds one frame of latency per thread, which only
        matters for the number of frames held back until a flush.
    */
    pub threads: Option<usize>,
}

impl VideoDecoderConfig {
    /**
        Create a new config with default settings.
    */
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Use a fixed number of decoding threads.
    */
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }
}

/**
    Configuration for audio decoder.

    Audio decoding is cheap enough that there is nothing to tune yet.
*/
#[derive(Clone, Debug, Default)]
pub struct AudioDecoderConfig {}

impl AudioDecoderConfig {
    /**
        Create a new config with default settings.
    */
    pub fn new() -> Self {
        Self::default()
    }
}
