//! Queue of inbound frames seen while waiting for a command reply.
//!
//! The queue is unbounded. If the application issues commands but never
//! calls [`Im920::read`](crate::Im920::read), every frame the radio delivers
//! in the meantime stays here, so poll `read` at least as often as frames
//! arrive.

use std::collections::VecDeque;

/// FIFO of raw inbound frame lines, oldest first.
#[derive(Debug, Default)]
pub struct PendingFrames {
    lines: VecDeque<Vec<u8>>,
}

impl PendingFrames {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame line.
    pub fn push(&mut self, line: &[u8]) {
        self.lines.push_back(line.to_vec());
    }

    /// Take the oldest frame line.
    pub fn pop(&mut self) -> Option<Vec<u8>> {
        self.lines.pop_front()
    }

    /// Number of queued frames.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterate over queued lines, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.lines.iter().map(Vec::as_slice)
    }

    /// Drop every queued frame, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.lines.len();
        self.lines.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = PendingFrames::new();
        queue.push(b"00,06E5,B5:0A\r\n");
        queue.push(b"00,06E5,B5:0B\r\n");
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.pop().unwrap(), b"00,06E5,B5:0A\r\n");
        assert_eq!(queue.pop().unwrap(), b"00,06E5,B5:0B\r\n");
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_iter_and_clear() {
        let mut queue = PendingFrames::new();
        queue.push(b"A:01\r\n");
        queue.push(b"B:02\r\n");

        let lines: Vec<&[u8]> = queue.iter().collect();
        assert_eq!(lines, vec![&b"A:01\r\n"[..], &b"B:02\r\n"[..]]);

        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());
    }
}
