/*!
    Timestamp types for media timing.
*/

use std::time::Duration;

use crate::Rational;

/**
    Presentation timestamp in time_base units.

    This is the raw timestamp value from the media stream. To convert to
    seconds you need the stream's time base.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pts(pub i64);

impl Pts {
    /**
        Convert this PTS to seconds using the given time base.

        Unlike [`Pts::to_duration`] this keeps the sign, since streams with
        edit lists may legitimately start slightly before zero.
    */
    #[inline]
    pub fn to_seconds(self, time_base: Rational) -> f64 {
        self.0 as f64 * time_base.num as f64 / time_base.den as f64
    }

    /**
        Create a PTS from seconds using the given time base, rounding to the
        nearest tick.
    */
    #[inline]
    pub fn from_seconds(seconds: f64, time_base: Rational) -> Self {
        Self((seconds * time_base.den as f64 / time_base.num as f64).round() as i64)
    }

    /**
        Convert this PTS to a Duration using the given time base.

        Negative PTS values are clamped to zero.
    */
    #[inline]
    pub fn to_duration(self, time_base: Rational) -> Duration {
        Duration::from_secs_f64(self.to_seconds(time_base).max(0.0))
    }
}

impl From<i64> for Pts {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Pts> for i64 {
    fn from(pts: Pts) -> Self {
        pts.0
    }
}

/**
    Duration in time_base units.

    Similar to Pts but semantically represents a span rather than a point in time.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MediaDuration(pub i64);

impl MediaDuration {
    /**
        Convert this duration to seconds using the given time base.

        Negative values are clamped to zero.
    */
    #[inline]
    pub fn to_seconds(self, time_base: Rational) -> f64 {
        (self.0 as f64 * time_base.num as f64 / time_base.den as f64).max(0.0)
    }

    /**
        Convert this duration to a std Duration using the given time base.
    */
    #[inline]
    pub fn to_duration(self, time_base: Rational) -> Duration {
        Duration::from_secs_f64(self.to_seconds(time_base))
    }
}

impl From<i64> for MediaDuration {
    fn from(value: i64) -> Self {
        Self(value)
    }
}
