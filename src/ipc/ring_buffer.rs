use std::{
    sync::{
        atomic::{AtomicU8, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
    time::Instant,
};

use packed_struct::prelude::*;
use thiserror::Error;

use super::layout::{PacketHeader, SharedHeader, PACKET_HEADER_SIZE, SHARED_HEADER_SIZE};

/// Smallest arena able to hold a packet and a sentinel
pub const MIN_CAPACITY: usize = PACKET_HEADER_SIZE * 2;

/// Possible errors creating or writing to a [RingBuffer]
#[derive(Error, Debug)]
pub enum RingBufferError {
    #[error("not enough free space for a packet of {size} bytes ({free} bytes free)")]
    Full { size: usize, free: usize },
    #[error("packet of {size} bytes can never fit in an arena of {capacity} bytes")]
    TooLarge { size: usize, capacity: usize },
    #[error("arena capacity of {0} bytes is too small")]
    InvalidCapacity(usize),
    #[error("failed to pack header: {0:?}")]
    Layout(PackingError),
}

/// Read and write position inside the arena
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Offsets {
    read: usize,
    write: usize,
}

impl Offsets {
    /// Free bytes in the arena. One byte always stays unused so a full
    /// buffer can be told apart from an empty one.
    fn free(&self, capacity: usize) -> usize {
        if self.write >= self.read {
            capacity - (self.write - self.read) - 1
        } else {
            self.read - self.write - 1
        }
    }
}

/// A packet returned by [RingBuffer::read]. The packet holds no lock; its
/// payload stays in place until [RingBuffer::free] is called.
pub struct Packet<'a> {
    arena: &'a [AtomicU8],
    header: PacketHeader,
    offset: usize,
}

impl Packet<'_> {
    pub fn packet_type(&self) -> u8 {
        self.header.packet_type
    }

    pub fn timestamp(&self) -> u64 {
        self.header.timestamp.to_primitive()
    }

    /// Size of the payload in bytes
    pub fn len(&self) -> usize {
        self.header.payload_size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes of the payload
    pub fn payload(&self) -> impl ExactSizeIterator<Item = u8> + '_ {
        let start = self.offset + PACKET_HEADER_SIZE;
        self.arena[start..start + self.len()]
            .iter()
            .map(|byte| byte.load(Ordering::Relaxed))
    }

    /// Copy the payload into `buf` and return the number of bytes copied
    pub fn copy_payload(&self, buf: &mut [u8]) -> usize {
        let mut copied = 0;
        for (dst, src) in buf.iter_mut().zip(self.payload()) {
            *dst = src;
            copied += 1;
        }
        copied
    }
}

impl std::fmt::Debug for Packet<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packet")
            .field("offset", &self.offset)
            .field("header", &self.header)
            .finish()
    }
}

/// Fixed size queue of type tagged, timestamped packets.
///
/// The memory holds a [SharedHeader] followed by the arena. Packets never
/// straddle the end of the arena: when one would, a sentinel packet is
/// written in its place (or, with less than a header left, nothing at all)
/// and the packet goes to the start. Offsets are mirrored into the shared
/// header after every change so an external reader can follow along.
///
/// Only the offsets are behind a lock. Producers copy packets into the space
/// they reserved without it, so a reader never stalls a writer.
pub struct RingBuffer {
    capacity: usize,
    epoch: Instant,
    memory: Box<[AtomicU8]>,
    offsets: Mutex<Offsets>,
    /// Serializes producers
    producer: Mutex<()>,
}

impl RingBuffer {
    /// Create a buffer with an arena of the given size in bytes
    pub fn new(capacity: usize) -> Result<Self, RingBufferError> {
        if capacity < MIN_CAPACITY {
            return Err(RingBufferError::InvalidCapacity(capacity));
        }
        let memory = (0..SHARED_HEADER_SIZE + capacity)
            .map(|_| AtomicU8::new(0))
            .collect();
        let buffer = Self {
            capacity,
            epoch: Instant::now(),
            memory,
            offsets: Mutex::new(Offsets::default()),
            producer: Mutex::new(()),
        };
        buffer.mirror(Offsets::default())?;
        Ok(buffer)
    }

    /// Size of the arena in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn free_space(&self) -> usize {
        self.lock_offsets().free(self.capacity)
    }

    pub fn is_empty(&self) -> bool {
        let offsets = self.lock_offsets();
        offsets.read == offsets.write
    }

    /// Returns the header as an external reader sees it
    pub fn shared_header(&self) -> Option<SharedHeader> {
        let _offsets = self.lock_offsets();
        SharedHeader::unpack(&load(&self.memory, 0)).ok()
    }

    /// Queue a packet stamped with the time since the buffer was created
    pub fn write(&self, packet_type: u8, payload: &[u8]) -> Result<(), RingBufferError> {
        let timestamp = self.epoch.elapsed().as_micros() as u64;
        self.write_with_timestamp(packet_type, timestamp, payload)
    }

    /// Queue a packet. Nothing is changed if it does not fit.
    pub fn write_with_timestamp(
        &self,
        packet_type: u8,
        timestamp: u64,
        payload: &[u8],
    ) -> Result<(), RingBufferError> {
        let size = PACKET_HEADER_SIZE + payload.len();
        if size >= self.capacity {
            return Err(RingBufferError::TooLarge {
                size,
                capacity: self.capacity,
            });
        }
        let header = PacketHeader::new(packet_type, timestamp, payload.len())
            .pack()
            .map_err(RingBufferError::Layout)?;
        let sentinel = PacketHeader::sentinel()
            .pack()
            .map_err(RingBufferError::Layout)?;

        let _producer = self.producer.lock().unwrap_or_else(PoisonError::into_inner);
        // The reader only ever frees space, so the reservation stays valid
        // after the lock is released
        let reserved = *self.lock_offsets();
        let (start, wrap) = self.placement(reserved, size)?;

        let arena = self.arena();
        let tail = self.capacity - reserved.write;
        if wrap && tail >= PACKET_HEADER_SIZE {
            store(arena, reserved.write, &sentinel);
        }
        store(arena, start, &header);
        store(arena, start + PACKET_HEADER_SIZE, payload);

        let mut offsets = self.lock_offsets();
        offsets.write = (start + size) % self.capacity;
        self.mirror(*offsets)
    }

    /// Returns where a packet of the given size goes and whether the rest of
    /// the arena is skipped to get there
    fn placement(&self, offsets: Offsets, size: usize) -> Result<(usize, bool), RingBufferError> {
        let Offsets { read, write } = offsets;
        let tail = self.capacity - write;
        if write >= read {
            // Filling the tail exactly wraps the write offset to the start,
            // which must not catch up with the reader
            if size < tail || (size == tail && read > 0) {
                return Ok((write, false));
            }
            if size < read {
                return Ok((0, true));
            }
        } else if write + size < read {
            return Ok((write, false));
        }
        Err(RingBufferError::Full {
            size,
            free: offsets.free(self.capacity),
        })
    }

    /// Returns the oldest packet without consuming it. Sentinels and the
    /// unused end of the arena are skipped.
    pub fn read(&self) -> Option<Packet<'_>> {
        let mut offsets = self.lock_offsets();
        let before = *offsets;
        let next = self.next_packet(&mut offsets);
        if *offsets != before {
            self.log_mirror(*offsets);
        }
        drop(offsets);

        let (offset, header) = next?;
        Some(Packet {
            arena: self.arena(),
            header,
            offset,
        })
    }

    /// Consume the packet that [RingBuffer::read] returns
    pub fn free(&self) {
        let mut offsets = self.lock_offsets();
        if let Some((offset, header)) = self.next_packet(&mut offsets) {
            offsets.read = (offset + header.total_size()) % self.capacity;
        }
        self.log_mirror(*offsets);
    }

    /// Find the packet at the read offset, moving the read offset past any
    /// padding in front of it
    fn next_packet(&self, offsets: &mut Offsets) -> Option<(usize, PacketHeader)> {
        let arena = self.arena();
        let mut wrapped = false;
        loop {
            if offsets.read == offsets.write {
                return None;
            }

            let skip = self.capacity - offsets.read < PACKET_HEADER_SIZE;
            let header = if skip {
                None
            } else {
                match PacketHeader::unpack(&load(arena, offsets.read)) {
                    Ok(header) => Some(header),
                    Err(e) => {
                        log::error!("Unreadable packet header at {}: {e:?}", offsets.read);
                        return None;
                    }
                }
            };

            match header {
                Some(header) if !header.is_sentinel() => {
                    if offsets.read + header.total_size() > self.capacity {
                        log::error!("Packet at {} overruns the arena: {header:?}", offsets.read);
                        return None;
                    }
                    return Some((offsets.read, header));
                }
                _ => {
                    if wrapped {
                        log::error!("Ring buffer wrapped twice without finding a packet");
                        return None;
                    }
                    wrapped = true;
                    offsets.read = 0;
                }
            }
        }
    }

    fn arena(&self) -> &[AtomicU8] {
        &self.memory[SHARED_HEADER_SIZE..]
    }

    /// Copy the offsets into the shared header
    fn mirror(&self, offsets: Offsets) -> Result<(), RingBufferError> {
        let header = SharedHeader::new(offsets.read, offsets.write)
            .pack()
            .map_err(RingBufferError::Layout)?;
        store(&self.memory, 0, &header);
        Ok(())
    }

    fn log_mirror(&self, offsets: Offsets) {
        if let Err(e) = self.mirror(offsets) {
            log::error!("Failed to update shared header: {e}");
        }
    }

    fn lock_offsets(&self) -> MutexGuard<'_, Offsets> {
        self.offsets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity)
            .field("offsets", &*self.lock_offsets())
            .finish()
    }
}

fn store(memory: &[AtomicU8], offset: usize, data: &[u8]) {
    for (cell, byte) in memory[offset..offset + data.len()].iter().zip(data) {
        cell.store(*byte, Ordering::Relaxed);
    }
}

fn load<const N: usize>(memory: &[AtomicU8], offset: usize) -> [u8; N] {
    let mut buf = [0; N];
    for (byte, cell) in buf.iter_mut().zip(&memory[offset..offset + N]) {
        *byte = cell.load(Ordering::Relaxed);
    }
    buf
}
