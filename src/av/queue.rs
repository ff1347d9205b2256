use std::collections::VecDeque;

use super::{Packet, INVALID_TIME};

/// FIFO of demuxed packets that reassembles `appendable` units.
///
/// A packet pushed after an appendable packet of the same stream is merged
/// into it. An appendable packet stays queued until its continuation arrives
/// or the queue is flushed, so [`pop`](Self::pop) never delivers a fragment.
#[derive(Debug, Default)]
pub struct PacketQueue {
    packets: VecDeque<Packet>,
    data_size: usize,
}

impl PacketQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, packet: Packet) {
        self.data_size += packet.size();

        let open = self
            .packets
            .iter_mut()
            .rev()
            .find(|p| p.stream_id == packet.stream_id)
            .filter(|p| p.appendable);

        match open {
            // A format change has to start its own unit
            Some(head) if packet.media_format.is_none() => {
                head.append(&packet);
                head.appendable = packet.appendable;
                if packet.stop_time != INVALID_TIME {
                    head.stop_time = packet.stop_time;
                }
            }
            Some(head) => {
                head.appendable = false;
                self.packets.push_back(packet);
            }
            None => self.packets.push_back(packet),
        }
    }

    /// Next complete packet, if the front of the queue is not still awaiting
    /// its continuation.
    pub fn pop(&mut self) -> Option<Packet> {
        if self.packets.front()?.appendable {
            return None;
        }
        let packet = self.packets.pop_front()?;
        self.data_size -= packet.size();
        Some(packet)
    }

    /// Marks every pending fragment complete, e.g. at end of stream.
    pub fn flush(&mut self) {
        for packet in &mut self.packets {
            packet.appendable = false;
        }
    }

    /// Drops everything queued, e.g. after a seek.
    pub fn clear(&mut self) {
        self.packets.clear();
        self.data_size = 0;
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Payload bytes currently queued.
    pub fn data_size(&self) -> usize {
        self.data_size
    }
}
