//! 有界 FIFO 队列（尾丢弃）
//!
//! 容量以 packet 个数计；队列满时新到达的 packet 被直接丢弃。

use std::collections::VecDeque;

use crate::net::Packet;
use crate::sim::SimError;

#[derive(Debug)]
pub struct BoundedQueue {
    capacity: usize,
    q: VecDeque<Packet>,
}

impl BoundedQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            q: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.q.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 入队：成功返回 Ok；队列已满则原样返回 Err(pkt)，队列内容不变。
    pub fn push(&mut self, pkt: Packet) -> Result<(), Packet> {
        if self.is_full() {
            return Err(pkt);
        }
        self.q.push_back(pkt);
        Ok(())
    }

    /// 出队。调用方应先检查 `is_empty()`；空队列返回 `SimError::EmptyQueue`。
    pub fn pop(&mut self) -> Result<Packet, SimError> {
        self.q.pop_front().ok_or(SimError::EmptyQueue)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Packet> {
        self.q.iter()
    }
}
