//! Replay ring buffer

pub mod replay;


pub use replay::RingBuffer;
