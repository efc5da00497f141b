/*!
    Video frame scaling and pixel format conversion for the ffmpeg reader
    crates.

    Decoders output frames in whatever format the codec specifies. This
    crate converts them to the format and size consumers ask for, usually
    packed RGB or single channel grayscale.

    # Example

    ```ignore
    use ffmpeg_transform::{VideoTransform, VideoTransformConfig};

    // Convert any video frame to 320x240 RGB
    let config = VideoTransformConfig::to_rgb24().with_size(320, 240);
    let mut transform = VideoTransform::new(config);

    for frame in decoded_frames {
        let rgb_frame = transform.transform(&frame)?;
        // rgb_frame.data holds 320 * 240 * 3 bytes
    }
    ```

    # Lazy Initialization

    The FFmpeg scaling context is created on first use and kept around
    for as long as the input and output stay the same. If the input
    format or size changes mid-stream, or the config is replaced, the
    context is rebuilt on the next frame.

    Transformation is stateless: each frame converts independently, so
    nothing needs to happen after a seek.
*/

pub use ffmpeg_types::{Error, PixelFormat, Result, VideoFrame};

mod video;

pub use video::{ScalingAlgorithm, VideoTransform, VideoTransformConfig};
