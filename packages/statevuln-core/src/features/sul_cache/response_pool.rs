/*
 * Response Pool
 *
 * Canonical response storage. Responses are bucketed by a cheap structural
 * key (record count, message count) and compared semantically inside a
 * bucket; a match hands out the stored `Arc` instead of a new allocation.
 *
 * Payloads above the byte limit are dropped before a new entry is stored.
 */

use crate::shared::models::{Response, ResponseFingerprint};
use rustc_hash::FxHashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct ResponsePool {
    buckets: FxHashMap<(usize, usize), Vec<Arc<ResponseFingerprint>>>,
    payload_limit: usize,
    reused: u64,
}

impl ResponsePool {
    pub fn new(payload_limit: usize) -> Self {
        Self {
            buckets: FxHashMap::default(),
            payload_limit,
            reused: 0,
        }
    }

    /// Shared copy of `response`, reusing a semantically equal entry
    pub fn canonicalize(&mut self, response: &Response) -> Response {
        let Response::Observed(fingerprint) = response else {
            return Response::IllegalTransition;
        };

        let bucket = self.buckets.entry(fingerprint.structural_key()).or_default();
        if let Some(existing) = bucket
            .iter()
            .find(|c| Arc::ptr_eq(c, fingerprint) || c.semantically_equals(fingerprint))
        {
            self.reused += 1;
            return Response::Observed(Arc::clone(existing));
        }

        let limit = self.payload_limit;
        let stored = if fingerprint.messages.iter().any(|m| m.payload.len() > limit) {
            Arc::new(fingerprint.reduced(limit))
        } else {
            Arc::clone(fingerprint)
        };
        bucket.push(Arc::clone(&stored));
        Response::Observed(stored)
    }

    /// Distinct stored fingerprints
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many canonicalizations returned an existing entry
    pub fn reused(&self) -> u64 {
        self.reused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{MessageKind, ObservedMessage, SocketState};

    fn hello_with_nonce(nonce: u8) -> Response {
        Response::observed(ResponseFingerprint::new(
            vec![ObservedMessage::new(MessageKind::ServerHello).with_payload(vec![nonce; 8])],
            1,
            SocketState::Up,
        ))
    }

    #[test]
    fn test_semantically_equal_responses_share_storage() {
        let mut pool = ResponsePool::new(32);
        let a = pool.canonicalize(&hello_with_nonce(1));
        let b = pool.canonicalize(&hello_with_nonce(2));
        match (&a, &b) {
            (Response::Observed(x), Response::Observed(y)) => assert!(Arc::ptr_eq(x, y)),
            _ => panic!("expected observed responses"),
        }
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.reused(), 1);
    }

    #[test]
    fn test_large_payloads_dropped() {
        let mut pool = ResponsePool::new(4);
        let stored = pool.canonicalize(&hello_with_nonce(9));
        let fp = stored.fingerprint().unwrap();
        assert!(fp.messages[0].payload.is_empty());
    }

    #[test]
    fn test_illegal_passes_through() {
        let mut pool = ResponsePool::new(32);
        assert!(pool.canonicalize(&Response::IllegalTransition).is_illegal());
        assert!(pool.is_empty());
    }
}
