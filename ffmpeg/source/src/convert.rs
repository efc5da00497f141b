/*!
    Conversions from FFmpeg values to our shared types.
*/

use std::time::Duration;

use ffmpeg_next::ffi::{AV_NOPTS_VALUE, AV_TIME_BASE};

use ffmpeg_types::{MediaDuration, Packet, Pts, Rational, StreamType};

/**
    Convert an FFmpeg rational, mapping unknown (`x/0`) values to `None`.
*/
pub(crate) fn rational(value: ffmpeg_next::Rational) -> Option<Rational> {
    Rational::try_new(value.numerator(), value.denominator())
}

/**
    Copy an FFmpeg packet into our packet type.
*/
pub(crate) fn packet(
    packet: &ffmpeg_next::Packet,
    stream_type: StreamType,
    time_base: Rational,
) -> Packet {
    Packet::new(
        packet.data().map(<[u8]>::to_vec).unwrap_or_default(),
        packet.pts().map(Pts),
        packet.dts().map(Pts),
        MediaDuration(packet.duration()),
        time_base,
        packet.is_key(),
        stream_type,
    )
}

/**
    Container duration in `AV_TIME_BASE` units. Unknown durations are
    reported as `AV_NOPTS_VALUE`, which is negative.
*/
pub(crate) fn container_duration(value: i64) -> Option<Duration> {
    (value > 0).then(|| Duration::from_secs_f64(value as f64 / AV_TIME_BASE as f64))
}

/**
    Container start time in seconds, from `AV_TIME_BASE` units. An unknown
    start time means the timestamps start at zero.
*/
pub(crate) fn container_start_time(value: i64) -> f64 {
    if value == AV_NOPTS_VALUE {
        return 0.0;
    }
    value as f64 / AV_TIME_BASE as f64
}

/**
    Stream duration in the stream's own time base.
*/
pub(crate) fn stream_duration(value: i64, time_base: Rational) -> Option<Duration> {
    (value > 0).then(|| MediaDuration(value).to_duration(time_base))
}

/**
    Seconds to a container-level seek timestamp in `AV_TIME_BASE` units.
*/
pub(crate) fn seek_timestamp(seconds: f64) -> i64 {
    (seconds * AV_TIME_BASE as f64).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_rational_is_none() {
        assert_eq!(rational(ffmpeg_next::Rational::new(0, 0)), None);
        assert_eq!(
            rational(ffmpeg_next::Rational::new(30000, 1001)),
            Some(Rational::new(30000, 1001))
        );
    }

    #[test]
    fn container_duration_handles_nopts() {
        assert_eq!(container_duration(i64::MIN), None);
        assert_eq!(container_duration(0), None);
        assert_eq!(
            container_duration(3_000_000),
            Some(Duration::from_secs(3))
        );
    }

    #[test]
    fn stream_duration_uses_time_base() {
        assert_eq!(
            stream_duration(30, Rational::new(1, 10)),
            Some(Duration::from_secs(3))
        );
        assert_eq!(stream_duration(-1, Rational::new(1, 10)), None);
    }

    #[test]
    fn container_start_time_defaults_to_zero() {
        assert_eq!(container_start_time(AV_NOPTS_VALUE), 0.0);
        assert_eq!(container_start_time(1_400_000), 1.4);
        assert_eq!(container_start_time(-20_000), -0.02);
    }

    #[test]
    fn seek_timestamp_is_microseconds() {
        assert_eq!(seek_timestamp(1.55), 1_550_000);
        assert_eq!(seek_timestamp(0.0), 0);
    }
}
