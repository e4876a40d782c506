//! 队列（Queue disciplines）
//!
//! 交换机只有一个固定容量的 FIFO 缓冲区，满时尾丢弃。

mod bounded;

pub use bounded::BoundedQueue;
