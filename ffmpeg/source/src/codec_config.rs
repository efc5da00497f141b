/*!
    Codec parameters handed from the source to the decoders.
*/

use ffmpeg_next::codec::Parameters;

/**
    Codec parameters of a selected stream.

    Holds an owned copy of the stream's parameters, so a decoder can be
    created from it independently of the container that produced it.
*/
pub struct CodecConfig {
    parameters: Parameters,
}

impl CodecConfig {
    pub(crate) fn new(parameters: &Parameters) -> Self {
        Self {
            parameters: parameters.clone(),
        }
    }

    /**
        Short name of the codec (e.g. `h264`).
    */
    pub fn codec_name(&self) -> &'static str {
        self.parameters.id().name()
    }

    /**
        Consume the config, returning the FFmpeg codec parameters.
    */
    pub fn into_parameters(self) -> Parameters {
        self.parameters
    }
}

impl std::fmt::Debug for CodecConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecConfig")
            .field("codec", &self.codec_name())
            .field("medium", &self.parameters.medium())
            .finish()
    }
}
