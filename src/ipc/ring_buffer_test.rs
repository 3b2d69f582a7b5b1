use std::{
    error::Error,
    sync::{mpsc, Arc},
    thread,
    time::Duration,
};

use packed_struct::types::SizedInteger;

use crate::ipc::{
    layout::{PACKET_TYPE_DATA, SHARED_HEADER_SIZE},
    ring_buffer::{RingBuffer, RingBufferError},
};

/// Read, copy and consume the oldest packet
fn pop(buffer: &RingBuffer) -> Option<(u8, Vec<u8>)> {
    let packet = buffer.read()?;
    let result = (packet.packet_type(), packet.payload().collect());
    drop(packet);
    buffer.free();
    Some(result)
}

fn write_offset(buffer: &RingBuffer) -> u64 {
    buffer.shared_header().unwrap().write_offset.to_primitive()
}

fn read_offset(buffer: &RingBuffer) -> u64 {
    buffer.shared_header().unwrap().read_offset.to_primitive()
}

#[tokio::test]
async fn test_fifo_order() -> Result<(), Box<dyn Error>> {
    let buffer = RingBuffer::new(128)?;
    assert!(buffer.is_empty());
    assert!(buffer.read().is_none());

    buffer.write(0x01, &[0xaa])?;
    buffer.write(0x02, &[0xbb, 0xbc])?;
    buffer.write(0x03, &[0xcc, 0xcd, 0xce])?;
    assert_eq!(buffer.free_space(), 127 - 78);

    assert_eq!(pop(&buffer), Some((0x01, vec![0xaa])));
    assert_eq!(pop(&buffer), Some((0x02, vec![0xbb, 0xbc])));
    assert_eq!(pop(&buffer), Some((0x03, vec![0xcc, 0xcd, 0xce])));
    assert_eq!(pop(&buffer), None);
    assert!(buffer.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_read_does_not_consume() -> Result<(), Box<dyn Error>> {
    let buffer = RingBuffer::new(128)?;
    buffer.write_with_timestamp(PACKET_TYPE_DATA, 1234, &[0x30, 0x01])?;

    for _ in 0..2 {
        let packet = buffer.read().unwrap();
        assert_eq!(packet.packet_type(), PACKET_TYPE_DATA);
        assert_eq!(packet.timestamp(), 1234);
        assert_eq!(packet.payload().collect::<Vec<_>>(), vec![0x30, 0x01]);

        let mut buf = [0; 8];
        assert_eq!(packet.copy_payload(&mut buf), 2);
        assert_eq!(&buf[..2], &[0x30, 0x01]);
    }
    buffer.free();
    assert!(buffer.read().is_none());

    // Freeing an empty buffer does nothing
    buffer.free();
    assert!(buffer.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_full_leaves_offsets_untouched() -> Result<(), Box<dyn Error>> {
    let buffer = RingBuffer::new(128)?;
    buffer.write(0x01, &[0x11; 40])?;
    assert_eq!(write_offset(&buffer), 64);

    let result = buffer.write(0x01, &[0x22; 40]);
    assert!(matches!(
        result,
        Err(RingBufferError::Full { size: 64, free: 63 })
    ));
    assert_eq!(write_offset(&buffer), 64);
    assert_eq!(read_offset(&buffer), 0);
    assert_eq!(pop(&buffer), Some((0x01, vec![0x11; 40])));
    assert_eq!(pop(&buffer), None);
    Ok(())
}

#[tokio::test]
async fn test_too_large() -> Result<(), Box<dyn Error>> {
    let buffer = RingBuffer::new(128)?;
    let result = buffer.write(0x01, &[0; 104]);
    assert!(matches!(
        result,
        Err(RingBufferError::TooLarge {
            size: 128,
            capacity: 128
        })
    ));
    assert!(buffer.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_invalid_capacity() -> Result<(), Box<dyn Error>> {
    assert!(matches!(
        RingBuffer::new(16),
        Err(RingBufferError::InvalidCapacity(16))
    ));
    Ok(())
}

#[tokio::test]
async fn test_sentinel_skipped() -> Result<(), Box<dyn Error>> {
    let buffer = RingBuffer::new(128)?;
    buffer.write(0x01, &[0x11; 40])?;
    pop(&buffer);
    buffer.write(0x02, &[0x22; 16])?;
    pop(&buffer);
    assert_eq!(write_offset(&buffer), 104);
    assert_eq!(read_offset(&buffer), 104);

    // 24 bytes are left at the end, enough for the sentinel only
    buffer.write(0x03, &[0x33; 16])?;
    assert_eq!(write_offset(&buffer), 40);
    {
        let memory_type = buffer.read().unwrap().packet_type();
        assert_eq!(memory_type, 0x03);
    }
    assert_eq!(read_offset(&buffer), 0);
    assert_eq!(pop(&buffer), Some((0x03, vec![0x33; 16])));
    assert_eq!(read_offset(&buffer), 40);
    assert!(buffer.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_implicit_wrap() -> Result<(), Box<dyn Error>> {
    let buffer = RingBuffer::new(128)?;
    buffer.write(0x01, &[0x11; 50])?;
    pop(&buffer);
    buffer.write(0x02, &[0x22; 10])?;
    pop(&buffer);
    assert_eq!(read_offset(&buffer), 108);

    // Less than a header is left at the end so no sentinel is written
    buffer.write(0x03, &[0x33; 8])?;
    assert_eq!(write_offset(&buffer), 32);
    assert_eq!(pop(&buffer), Some((0x03, vec![0x33; 8])));
    assert!(buffer.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_shared_header() -> Result<(), Box<dyn Error>> {
    let buffer = RingBuffer::new(0x100)?;
    let header = buffer.shared_header().unwrap();
    assert!(header.is_valid());
    assert_eq!(&header.magic, b"HIDRB");
    assert_eq!(SHARED_HEADER_SIZE, 24);

    buffer.write(PACKET_TYPE_DATA, &[0x30])?;
    assert_eq!(write_offset(&buffer), 25);
    assert_eq!(read_offset(&buffer), 0);
    Ok(())
}

#[tokio::test]
async fn test_many_wraps() -> Result<(), Box<dyn Error>> {
    let buffer = RingBuffer::new(200)?;
    for i in 0..100u8 {
        let payload = vec![i; (i % 30) as usize];
        buffer.write(i, &payload)?;
        assert_eq!(pop(&buffer), Some((i, payload)));
    }
    Ok(())
}

#[tokio::test]
async fn test_reader_never_blocks_writer() -> Result<(), Box<dyn Error>> {
    let buffer = Arc::new(RingBuffer::new(128)?);
    buffer.write(PACKET_TYPE_DATA, &[0x01, 0x02])?;
    let packet = buffer.read().unwrap();

    // Write from another thread while the packet is held
    let (tx, rx) = mpsc::channel();
    let producer = buffer.clone();
    let handle = thread::spawn(move || {
        let result = producer.write(PACKET_TYPE_DATA, &[0x03]).is_ok();
        let _ = tx.send(result);
    });
    assert_eq!(rx.recv_timeout(Duration::from_millis(500)), Ok(true));
    let _ = handle.join();

    // The held packet is untouched and the buffer can still be inspected
    assert_eq!(packet.payload().collect::<Vec<_>>(), vec![0x01, 0x02]);
    assert_eq!(write_offset(&buffer), 51);
    buffer.free();
    assert_eq!(read_offset(&buffer), 26);
    assert_eq!(pop(&buffer), Some((PACKET_TYPE_DATA, vec![0x03])));
    Ok(())
}
