//! Wire layout of the shared ring buffer. Offsets and sizes are fixed since
//! the reader lives outside this crate.
use packed_struct::prelude::*;

/// Magic at the very start of the shared memory
pub const MAGIC: [u8; 5] = *b"HIDRB";

/// Size of the [SharedHeader] in front of the arena
pub const SHARED_HEADER_SIZE: usize = 24;
/// Size of the [PacketHeader] in front of every payload
pub const PACKET_HEADER_SIZE: usize = 24;

/// Packet type telling the reader to continue at the start of the arena
pub const SENTINEL_TYPE: u8 = 0xff;
/// Packet type of a HID report sent to the console
pub const PACKET_TYPE_DATA: u8 = 0x04;

/// Header of the shared memory. The offsets are relative to the start of the
/// arena that follows the header.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Eq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "24")]
pub struct SharedHeader {
    #[packed_field(bytes = "0..=4")]
    pub magic: [u8; 5],
    #[packed_field(bytes = "5..=7")]
    pub _reserved: [u8; 3],
    #[packed_field(bytes = "8..=15", endian = "lsb")]
    pub read_offset: Integer<u64, packed_bits::Bits<64>>,
    #[packed_field(bytes = "16..=23", endian = "lsb")]
    pub write_offset: Integer<u64, packed_bits::Bits<64>>,
}

impl SharedHeader {
    pub fn new(read_offset: usize, write_offset: usize) -> Self {
        Self {
            magic: MAGIC,
            _reserved: [0; 3],
            read_offset: Integer::from_primitive(read_offset as u64),
            write_offset: Integer::from_primitive(write_offset as u64),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == MAGIC
    }
}

/// Header in front of every packet in the arena
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Eq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "24")]
pub struct PacketHeader {
    #[packed_field(bytes = "0")]
    pub packet_type: u8,
    #[packed_field(bytes = "1..=7")]
    pub _reserved: [u8; 7],
    /// Microseconds since the buffer was created
    #[packed_field(bytes = "8..=15", endian = "lsb")]
    pub timestamp: Integer<u64, packed_bits::Bits<64>>,
    /// Size of the payload that follows the header
    #[packed_field(bytes = "16..=23", endian = "lsb")]
    pub size: Integer<u64, packed_bits::Bits<64>>,
}

impl PacketHeader {
    pub fn new(packet_type: u8, timestamp: u64, size: usize) -> Self {
        Self {
            packet_type,
            _reserved: [0; 7],
            timestamp: Integer::from_primitive(timestamp),
            size: Integer::from_primitive(size as u64),
        }
    }

    pub fn sentinel() -> Self {
        Self::new(SENTINEL_TYPE, 0, 0)
    }

    pub fn is_sentinel(&self) -> bool {
        self.packet_type == SENTINEL_TYPE
    }

    /// Payload size in bytes
    pub fn payload_size(&self) -> usize {
        self.size.to_primitive() as usize
    }

    /// Size of the header and payload together
    pub fn total_size(&self) -> usize {
        PACKET_HEADER_SIZE.saturating_add(self.payload_size())
    }
}
