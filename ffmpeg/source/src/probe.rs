/*!
    Container probing and stream selection.
*/

use std::path::Path;

use ffmpeg_next::{
    codec,
    format::{
        context::Input,
        stream::{Disposition, Stream},
    },
    media,
};
use log::{debug, warn};

use ffmpeg_types::{AudioStreamInfo, Error, MediaInfo, Result, StreamType, VideoStreamInfo};

use crate::codec_config::CodecConfig;
use crate::convert;

/**
    Streams picked from a container, with the codec parameters needed to
    build their decoders.
*/
pub(crate) struct Selection {
    pub info: MediaInfo,
    pub video_codec: Option<CodecConfig>,
    pub audio_codec: Option<CodecConfig>,
}

/**
    Probe a media file for metadata without reading any packets.

    Fails with an I/O error if the file does not exist, and with an
    unsupported format error if FFmpeg cannot open it.
*/
pub fn probe<P: AsRef<Path>>(path: P) -> Result<MediaInfo> {
    let input = open_input(path.as_ref())?;
    Ok(inspect(&input)?.info)
}

pub(crate) fn open_input(path: &Path) -> Result<Input> {
    ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;

    // FFmpeg reports a missing file as a bare errno, check first for a proper io::Error
    std::fs::metadata(path)?;

    ffmpeg_next::format::input(path)
        .map_err(|e| Error::unsupported_format(format!("{}: {e}", path.display())))
}

/**
    Select the first video stream and the first audio stream of a container.

    Attached pictures (cover art) are video streams in FFmpeg's eyes and are
    skipped. An undecodable video codec is an error; an undecodable audio
    codec only drops the audio stream.
*/
pub(crate) fn inspect(input: &Input) -> Result<Selection> {
    let mut video = None;
    let mut audio = None;

    for stream in input.streams() {
        match stream.parameters().medium() {
            media::Type::Video if video.is_none() => {
                if stream.disposition().contains(Disposition::ATTACHED_PIC) {
                    debug!("[source] skipping attached picture stream {}", stream.index());
                    continue;
                }
                video = Some(video_stream(&stream)?);
            }
            media::Type::Audio if audio.is_none() => match audio_stream(&stream) {
                Ok(selected) => audio = Some(selected),
                Err(e) => warn!("[source] ignoring audio stream {}: {e}", stream.index()),
            },
            _ => {}
        }
    }

    if video.is_none() && audio.is_none() {
        return Err(Error::StreamNotFound {
            stream_type: StreamType::Video,
        });
    }

    let (video_info, video_codec) = video.unzip();
    let (audio_info, audio_codec) = audio.unzip();

    // SAFETY: the format context stays valid for as long as `input` is borrowed
    let start_time = unsafe { (*input.as_ptr()).start_time };

    Ok(Selection {
        info: MediaInfo {
            format_name: input.format().name().to_string(),
            start_time: convert::container_start_time(start_time),
            duration: convert::container_duration(input.duration()),
            video: video_info,
            audio: audio_info,
        },
        video_codec,
        audio_codec,
    })
}

fn video_stream(stream: &Stream<'_>) -> Result<(VideoStreamInfo, CodecConfig)> {
    let parameters = stream.parameters();
    let codec = CodecConfig::new(&parameters);

    let decoder = codec::context::Context::from_parameters(parameters)
        .and_then(|context| context.decoder().video())
        .map_err(|e| {
            Error::unsupported_format(format!("video codec {}: {e}", codec.codec_name()))
        })?;

    let time_base = convert::rational(stream.time_base())
        .ok_or_else(|| Error::invalid_data("video stream has no time base"))?;

    let frame_rate = convert::rational(stream.avg_frame_rate())
        .filter(|rate| rate.is_positive())
        .or_else(|| convert::rational(stream.rate()).filter(|rate| rate.is_positive()));

    let frames = stream.frames();

    let info = VideoStreamInfo {
        index: stream.index(),
        width: decoder.width(),
        height: decoder.height(),
        frame_rate,
        time_base,
        frame_count: (frames > 0).then_some(frames as u64),
        duration: convert::stream_duration(stream.duration(), time_base),
        codec_name: codec.codec_name().to_string(),
    };

    Ok((info, codec))
}

fn audio_stream(stream: &Stream<'_>) -> Result<(AudioStreamInfo, CodecConfig)> {
    let parameters = stream.parameters();
    let codec = CodecConfig::new(&parameters);

    let decoder = codec::context::Context::from_parameters(parameters)
        .and_then(|context| context.decoder().audio())
        .map_err(|e| {
            Error::unsupported_format(format!("audio codec {}: {e}", codec.codec_name()))
        })?;

    let time_base = convert::rational(stream.time_base())
        .ok_or_else(|| Error::invalid_data("audio stream has no time base"))?;

    let info = AudioStreamInfo {
        index: stream.index(),
        sample_rate: decoder.rate(),
        channels: decoder.channels() as u16,
        time_base,
        duration: convert::stream_duration(stream.duration(), time_base),
        codec_name: codec.codec_name().to_string(),
    };

    Ok((info, codec))
}
