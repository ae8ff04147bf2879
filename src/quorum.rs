//! Quorum Gate: a read-only view over the Health Map that decides whether
//! the primary may admit new produce requests.
//!
//! Gates writes only. Reads are never refused here.

use std::sync::Arc;

use crate::health::HealthMap;

/// Thin, read-only wrapper around a shared [`HealthMap`].
#[derive(Clone)]
pub struct QuorumGate {
    map: Arc<HealthMap>,
}

impl QuorumGate {
    pub fn new(map: Arc<HealthMap>) -> Self {
        Self { map }
    }

    /// True iff healthy peers + 1 (the primary) is strictly
    /// greater than floor((N+1)/2).
    pub fn admits_writes(&self) -> bool {
        self.map.admits_writes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthMap;

    #[test]
    fn gate_reflects_the_underlying_map() {
        let map = Arc::new(HealthMap::new(&["s1".into(), "s2".into()]));
        let gate = QuorumGate::new(map.clone());
        assert!(!gate.admits_writes());
    }
}
