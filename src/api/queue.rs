use std::collections::VecDeque;

use super::request::{RequestId, ValidationRequest};

/// Pending requests in submission order.
#[derive(Debug, Default)]
pub struct RequestQueue {
    pending: VecDeque<ValidationRequest>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, request: ValidationRequest) {
        self.pending.push_back(request);
    }

    pub fn dequeue_one(&mut self) -> Option<ValidationRequest> {
        self.pending.pop_front()
    }

    /// Empties the queue, oldest request first.
    pub fn dequeue_all(&mut self) -> impl Iterator<Item = ValidationRequest> + '_ {
        self.pending.drain(..)
    }

    /// Withdraws a request that has not been dequeued yet.
    pub fn remove(&mut self, id: RequestId) -> Option<ValidationRequest> {
        let position = self.pending.iter().position(|r| r.id() == id)?;
        self.pending.remove(position)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationRequest> {
        self.pending.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: u64, student_id: &str) -> ValidationRequest {
        ValidationRequest::new(RequestId(id), student_id, "Acme").unwrap()
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = RequestQueue::new();
        for (i, sid) in ["A", "B", "C"].iter().enumerate() {
            queue.enqueue(request(i as u64, sid));
        }

        assert_eq!(queue.dequeue_one().unwrap().student_id(), "A");
        let rest: Vec<String> = queue
            .dequeue_all()
            .map(|r| r.student_id().to_string())
            .collect();
        assert_eq!(rest, vec!["B", "C"]);
        assert!(queue.is_empty());
        assert!(queue.dequeue_one().is_none());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut queue = RequestQueue::new();
        queue.enqueue(request(1, "X"));
        queue.enqueue(request(2, "X"));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_remove_pending_request() {
        let mut queue = RequestQueue::new();
        queue.enqueue(request(1, "A"));
        queue.enqueue(request(2, "B"));
        queue.enqueue(request(3, "C"));

        let removed = queue.remove(RequestId(2)).unwrap();
        assert_eq!(removed.student_id(), "B");
        assert!(queue.remove(RequestId(2)).is_none());

        let ids: Vec<RequestId> = queue.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![RequestId(1), RequestId(3)]);
    }
}
