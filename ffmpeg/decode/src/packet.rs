/*!
    Conversion of our packets back into FFmpeg packets.
*/

use ffmpeg_next::packet::Mut as PacketMut;

use ffmpeg_types::Packet;

/**
    Copy a packet into an FFmpeg packet, carrying over its timing.

    Must not be called with an empty packet: FFmpeg treats an empty packet
    as the end of the stream.
*/
pub(crate) fn to_ffmpeg(packet: &Packet) -> ffmpeg_next::Packet {
    let mut ffmpeg_pkt = ffmpeg_next::Packet::copy(&packet.data);

    // SAFETY: the packet was just allocated and is exclusively owned here
    unsafe {
        let pkt_ptr = ffmpeg_pkt.as_mut_ptr();
        if let Some(pts) = packet.pts {
            (*pkt_ptr).pts = pts.0;
        }
        if let Some(dts) = packet.dts {
            (*pkt_ptr).dts = dts.0;
        }
        (*pkt_ptr).duration = packet.duration.0;
    }

    if packet.is_keyframe {
        ffmpeg_pkt.set_flags(ffmpeg_next::packet::Flags::KEY);
    }

    ffmpeg_pkt
}
