/*!
    Pixel and sample format types.
*/

/**
    Video pixel formats.

    This is the subset of formats the decoder hands out directly. Anything
    else coming out of a codec is converted to [`PixelFormat::Yuv420p`]
    before it leaves the decode crate.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 12bpp (most common video format)
    Yuv420p,
    /// Semi-planar YUV 4:2:0, 12bpp (common hardware decoder output)
    Nv12,
    /// Packed BGRA, 32bpp
    Bgra,
    /// Packed RGBA, 32bpp
    Rgba,
    /// Packed RGB, 24bpp (color reader output)
    Rgb24,
    /// Packed BGR, 24bpp (uncompressed DIB video)
    Bgr24,
    /// Planar YUV 4:2:2, 16bpp
    Yuv422p,
    /// Planar YUV 4:4:4, 24bpp
    Yuv444p,
    /// Planar YUV 4:2:0, 10-bit little-endian samples
    Yuv420p10,
    /// Single channel luma, 8bpp (grayscale reader output)
    Gray8,
}

/**
    Memory layout of one plane of a tightly packed frame buffer.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlaneLayout {
    /// Bytes in one row of the plane, without padding.
    pub row_bytes: usize,
    /// Number of rows in the plane.
    pub rows: usize,
}

impl PlaneLayout {
    /**
        Total number of bytes in the plane.
    */
    pub const fn size(self) -> usize {
        self.row_bytes * self.rows
    }
}

impl PixelFormat {
    /**
        Returns the number of bits per pixel for this format.

        For planar formats, this is the average bits per pixel.
    */
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            Self::Gray8 => 8,
            Self::Yuv420p | Self::Nv12 => 12,
            Self::Yuv420p10 => 24, // 16-bit storage * 1.5 samples per pixel
            Self::Yuv422p => 16,
            Self::Rgb24 | Self::Bgr24 | Self::Yuv444p => 24,
            Self::Bgra | Self::Rgba => 32,
        }
    }

    /**
        Returns true if this is a planar format.
    */
    pub const fn is_planar(self) -> bool {
        match self {
            Self::Yuv420p | Self::Yuv422p | Self::Yuv444p | Self::Yuv420p10 => true,
            Self::Nv12 => true, // semi-planar counts as planar
            Self::Bgra | Self::Rgba | Self::Rgb24 | Self::Bgr24 | Self::Gray8 => false,
        }
    }

    /**
        Returns the plane layout of a tightly packed frame of the given size.

        Chroma planes round their dimensions up, matching FFmpeg for odd
        frame sizes.
    */
    pub fn planes(self, width: u32, height: u32) -> Vec<PlaneLayout> {
        let w = width as usize;
        let h = height as usize;
        let cw = w.div_ceil(2);
        let ch = h.div_ceil(2);
        let plane = |row_bytes, rows| PlaneLayout { row_bytes, rows };

        match self {
            Self::Gray8 => vec![plane(w, h)],
            Self::Rgb24 | Self::Bgr24 => vec![plane(w * 3, h)],
            Self::Bgra | Self::Rgba => vec![plane(w * 4, h)],
            Self::Yuv420p => vec![plane(w, h), plane(cw, ch), plane(cw, ch)],
            Self::Yuv420p10 => vec![plane(w * 2, h), plane(cw * 2, ch), plane(cw * 2, ch)],
            Self::Nv12 => vec![plane(w, h), plane(cw * 2, ch)],
            Self::Yuv422p => vec![plane(w, h), plane(cw, h), plane(cw, h)],
            Self::Yuv444p => vec![plane(w, h), plane(w, h), plane(w, h)],
        }
    }

    /**
        Returns the size in bytes of a tightly packed frame of the given size.
    */
    pub fn buffer_size(self, width: u32, height: u32) -> usize {
        self.planes(width, height).iter().map(|p| p.size()).sum()
    }
}

/**
    Audio sample formats.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SampleFormat {
    /// 32-bit floating point, range [-1.0, 1.0]
    F32,
    /// 64-bit floating point
    F64,
    /// Signed 16-bit integer
    S16,
    /// Signed 32-bit integer
    S32,
    /// Unsigned 8-bit integer
    U8,
}

impl SampleFormat {
    /**
        Returns the number of bytes per sample.
    */
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::S16 => 2,
            Self::S32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    /**
        Returns true if this is a floating-point format.
    */
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }
}

/**
    Audio channel layout.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ChannelLayout {
    /// Single channel
    Mono,
    /// Left and right channels
    Stereo,
    /// Any other channel count, in decoder order
    Other(u16),
}

impl ChannelLayout {
    /**
        Pick the layout for a decoder-reported channel count.
    */
    pub const fn from_channels(channels: u16) -> Self {
        match channels {
            1 => Self::Mono,
            2 => Self::Stereo,
            n => Self::Other(n),
        }
    }

    /**
        Returns the number of channels.
    */
    pub const fn channels(self) -> u16 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
            Self::Other(n) => n,
        }
    }
}
