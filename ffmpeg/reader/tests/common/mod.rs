//! Uncompressed AVI fixtures for driving the reader through FFmpeg.
//!
//! Video is raw BGR24, every pixel of frame `i` set to `i * 8`, with an
//! index entry marked as keyframe only every `KEYFRAME_INTERVAL` frames.
//! Audio, when present, is 16-bit mono PCM with one chunk per video frame.

#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;

pub const WIDTH: u32 = 32;
pub const HEIGHT: u32 = 24;
pub const FRAMES: u32 = 30;
pub const FPS: u32 = 10;
pub const KEYFRAME_INTERVAL: u32 = 10;
pub const SAMPLE_RATE: u32 = 8000;
pub const SAMPLES_PER_FRAME: u32 = SAMPLE_RATE / FPS;

const FRAME_BYTES: u32 = WIDTH * HEIGHT * 3;
const AUDIO_BYTES: u32 = SAMPLES_PER_FRAME * 2;
const AVIIF_KEYFRAME: u32 = 0x10;

pub fn frame_value(index: u32) -> u8 {
    (index * 8) as u8
}

pub struct Fixture {
    // Removes the file when dropped
    _dir: TempDir,
    pub path: PathBuf,
}

pub fn avi_with_audio() -> Fixture {
    write_avi(true)
}

pub fn avi_video_only() -> Fixture {
    write_avi(false)
}

fn write_avi(with_audio: bool) -> Fixture {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("fixture.avi");
    std::fs::write(&path, build_avi(with_audio)).expect("write fixture");
    Fixture { _dir: dir, path }
}

fn build_avi(with_audio: bool) -> Vec<u8> {
    let streams = if with_audio { 2 } else { 1 };

    let mut avih = Vec::new();
    for value in [
        1_000_000 / FPS,                        // microseconds per frame
        FRAME_BYTES * FPS + AUDIO_BYTES * FPS,  // max bytes per second
        0,                                      // padding granularity
        0x110,                                  // has index, interleaved
        FRAMES,
        0,
        streams,
        FRAME_BYTES,
        WIDTH,
        HEIGHT,
        0,
        0,
        0,
        0,
    ] {
        put_u32(&mut avih, value);
    }

    let mut hdrl = chunk(b"avih", &avih);
    hdrl.extend(list(b"strl", &video_stream_header()));
    if with_audio {
        hdrl.extend(list(b"strl", &audio_stream_header()));
    }

    let mut movi = Vec::new();
    let mut index = Vec::new();
    for frame in 0..FRAMES {
        if with_audio {
            let samples = vec![(frame % 256) as u8; AUDIO_BYTES as usize];
            push_indexed(&mut movi, &mut index, b"01wb", &samples, AVIIF_KEYFRAME);
        }
        let pixels = vec![frame_value(frame); FRAME_BYTES as usize];
        let flags = if frame % KEYFRAME_INTERVAL == 0 {
            AVIIF_KEYFRAME
        } else {
            0
        };
        push_indexed(&mut movi, &mut index, b"00db", &pixels, flags);
    }

    let mut body = b"AVI ".to_vec();
    body.extend(list(b"hdrl", &hdrl));
    body.extend(list(b"movi", &movi));
    body.extend(chunk(b"idx1", &index));

    let mut file = b"RIFF".to_vec();
    put_u32(&mut file, body.len() as u32);
    file.extend(body);
    file
}

fn video_stream_header() -> Vec<u8> {
    let mut strh = Vec::new();
    strh.extend(b"vids");
    strh.extend([0; 4]); // handler
    put_u32(&mut strh, 0); // flags
    put_u16(&mut strh, 0); // priority
    put_u16(&mut strh, 0); // language
    put_u32(&mut strh, 0); // initial frames
    put_u32(&mut strh, 1); // scale
    put_u32(&mut strh, FPS); // rate
    put_u32(&mut strh, 0); // start
    put_u32(&mut strh, FRAMES); // length
    put_u32(&mut strh, FRAME_BYTES); // suggested buffer size
    put_u32(&mut strh, u32::MAX); // quality
    put_u32(&mut strh, 0); // sample size
    for value in [0, 0, WIDTH as u16, HEIGHT as u16] {
        put_u16(&mut strh, value);
    }

    let mut strf = Vec::new();
    put_u32(&mut strf, 40);
    put_u32(&mut strf, WIDTH);
    put_u32(&mut strf, (-(HEIGHT as i32)) as u32); // top-down rows
    put_u16(&mut strf, 1); // planes
    put_u16(&mut strf, 24); // bits per pixel
    put_u32(&mut strf, 0); // BI_RGB
    put_u32(&mut strf, FRAME_BYTES);
    for _ in 0..4 {
        put_u32(&mut strf, 0);
    }

    let mut strl = chunk(b"strh", &strh);
    strl.extend(chunk(b"strf", &strf));
    strl
}

fn audio_stream_header() -> Vec<u8> {
    let block_align = 2;

    let mut strh = Vec::new();
    strh.extend(b"auds");
    strh.extend([0; 4]);
    put_u32(&mut strh, 0);
    put_u16(&mut strh, 0);
    put_u16(&mut strh, 0);
    put_u32(&mut strh, 0);
    put_u32(&mut strh, block_align); // scale
    put_u32(&mut strh, SAMPLE_RATE * block_align); // rate, bytes per second
    put_u32(&mut strh, 0);
    put_u32(&mut strh, SAMPLES_PER_FRAME * FRAMES); // length in blocks
    put_u32(&mut strh, AUDIO_BYTES);
    put_u32(&mut strh, u32::MAX);
    put_u32(&mut strh, block_align); // sample size
    for _ in 0..4 {
        put_u16(&mut strh, 0);
    }

    let mut strf = Vec::new();
    put_u16(&mut strf, 1); // PCM
    put_u16(&mut strf, 1); // channels
    put_u32(&mut strf, SAMPLE_RATE);
    put_u32(&mut strf, SAMPLE_RATE * block_align);
    put_u16(&mut strf, block_align as u16);
    put_u16(&mut strf, 16); // bits per sample

    let mut strl = chunk(b"strh", &strh);
    strl.extend(chunk(b"strf", &strf));
    strl
}

/// Appends a chunk to the movi body and its idx1 entry. Offsets are
/// relative to the `movi` fourcc, which precedes the body.
fn push_indexed(movi: &mut Vec<u8>, index: &mut Vec<u8>, id: &[u8; 4], data: &[u8], flags: u32) {
    let offset = 4 + movi.len() as u32;
    movi.extend(chunk(id, data));

    index.extend(id);
    put_u32(index, flags);
    put_u32(index, offset);
    put_u32(index, data.len() as u32);
}

fn chunk(id: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = id.to_vec();
    put_u32(&mut out, data.len() as u32);
    out.extend(data);
    if data.len() % 2 == 1 {
        out.push(0);
    }
    out
}

fn list(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut out = b"LIST".to_vec();
    put_u32(&mut out, body.len() as u32 + 4);
    out.extend(kind);
    out.extend(body);
    out
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend(value.to_le_bytes());
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend(value.to_le_bytes());
}
