//! Transport between the emulator and the IPC consumer.
//!
//! Translated reports are queued in a [ring_buffer::RingBuffer] whose memory
//! starts with a [layout::SharedHeader] so it can be handed to a reader in
//! another process as is.
pub mod layout;
pub mod ring_buffer;
#[cfg(test)]
pub mod ring_buffer_test;
