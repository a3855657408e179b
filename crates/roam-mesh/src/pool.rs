//! Node pools.
//!
//! A [`TriNodePool`] is a fixed block of node slots handed out in pairs and
//! cleared in bulk once per frame. [`TriNodePools`] owns one pool per worker
//! for a render pass and grows them between frames when a worker ran dry.

use roam_core::{Error, Result};
use tracing::{error, info, warn};

use crate::node::{ChildPair, TriNode};

/// Smallest pool that can hold a single split.
const MIN_POOL_NODES: usize = 2;

/// A bounded store of tree nodes with an even watermark.
#[derive(Debug)]
pub struct TriNodePool {
    nodes: Vec<TriNode>,
    next: usize,
    starved: bool,
}

impl TriNodePool {
    /// Allocate a pool of `capacity` nodes, rounded up to an even count.
    ///
    /// Allocation failure is reported instead of aborting.
    pub fn try_new(capacity: usize) -> Result<Self> {
        let capacity = capacity + (capacity & 1);
        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(capacity)
            .map_err(|_| Error::PoolAllocation {
                requested: capacity,
            })?;
        nodes.resize(capacity, TriNode::default());

        Ok(Self {
            nodes,
            next: 0,
            starved: false,
        })
    }

    /// Clear every slot handed out since the last reset.
    pub fn reset(&mut self) {
        self.nodes[..self.next].fill(TriNode::default());
        self.next = 0;
        self.starved = false;
    }

    /// Hand out two fresh sibling nodes, or `None` once fewer than two remain.
    pub fn allocate(&mut self) -> Option<ChildPair> {
        if self.is_exhausted() {
            self.starved = true;
            return None;
        }
        let pair = ChildPair::new(self.next as u32);
        self.next += 2;
        Some(pair)
    }

    /// Check that `count` nodes are still free, recording starvation if not.
    pub fn reserve(&mut self, count: usize) -> bool {
        if self.remaining() < count {
            self.starved = true;
            return false;
        }
        true
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.nodes.len() - self.next
    }

    /// True when not even one more pair fits.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() < 2
    }

    /// True if a request was refused since the last reset.
    #[inline]
    pub const fn is_starved(&self) -> bool {
        self.starved
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes handed out since the last reset.
    #[inline]
    pub const fn allocated(&self) -> usize {
        self.next
    }

    #[inline]
    pub(crate) fn node(&self, slot: u32) -> &TriNode {
        &self.nodes[slot as usize]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, slot: u32) -> &mut TriNode {
        &mut self.nodes[slot as usize]
    }
}

/// Per-worker size for a pass budget of `total` nodes.
///
/// No worker gets less than a third of the budget, so high thread counts do
/// not starve individual workers.
pub fn per_worker_size(total: usize, workers: usize) -> usize {
    let size = (total / workers.max(1)).max(total / 3);
    size + (size & 1)
}

/// The node pools of one render pass, one per worker.
#[derive(Debug)]
pub struct TriNodePools {
    pools: Vec<TriNodePool>,
    workers: usize,
    total: usize,
    ceiling: usize,
}

impl TriNodePools {
    /// Create `workers` pools sharing a budget of `total` nodes that may grow
    /// up to `ceiling`.
    pub fn new(workers: usize, total: usize, ceiling: usize) -> Result<Self> {
        let mut pools = Self {
            pools: Vec::new(),
            workers: workers.max(1),
            total: 0,
            ceiling: ceiling.max(total),
        };
        pools.init(total)?;
        Ok(pools)
    }

    /// (Re)allocate all pools for a budget of `total` nodes.
    ///
    /// Allocation failures retry at 75% of the budget and lower the ceiling
    /// to the reduced size. Fails only when not even a minimal pool fits;
    /// the current pools are kept in that case.
    pub fn init(&mut self, total: usize) -> Result<()> {
        self.init_with(total, TriNodePool::try_new)
    }

    fn init_with<A>(&mut self, total: usize, mut alloc: A) -> Result<()>
    where
        A: FnMut(usize) -> Result<TriNodePool>,
    {
        let mut total = total;
        loop {
            let size = per_worker_size(total, self.workers);
            if size < MIN_POOL_NODES {
                error!(total, workers = self.workers, "Node pool budget too small");
                return Err(Error::PoolAllocation { requested: total });
            }

            // The current set stays in place until the new one is complete.
            match (0..self.workers)
                .map(|_| alloc(size))
                .collect::<Result<Vec<_>>>()
            {
                Ok(pools) => {
                    info!(
                        total,
                        per_worker = size,
                        workers = self.workers,
                        "Initialized node pools"
                    );
                    self.pools = pools;
                    self.total = total;
                    return Ok(());
                }
                Err(err) => {
                    let retry = total - total / 4;
                    if retry == total {
                        error!(total, %err, "Failed to allocate node pools");
                        return Err(err);
                    }
                    warn!(total, retry, %err, "Node pool allocation failed, retrying smaller");
                    self.ceiling = retry;
                    total = retry;
                }
            }
        }
    }

    /// Reset every pool for a new frame.
    ///
    /// If any pool ran out of nodes since the last reset and the budget is
    /// below the ceiling, all pools are reallocated at twice the budget
    /// (capped at the ceiling). Returns whether the pools grew.
    ///
    /// A failed growth keeps the current pools and pins the ceiling to
    /// their size.
    pub fn reset_all(&mut self) -> bool {
        self.reset_all_with(TriNodePool::try_new)
    }

    fn reset_all_with<A>(&mut self, alloc: A) -> bool
    where
        A: FnMut(usize) -> Result<TriNodePool>,
    {
        let starved = self.pools.iter().any(TriNodePool::is_starved);

        if starved && self.total < self.ceiling {
            let grown = (self.total * 2).min(self.ceiling);
            info!(from = self.total, to = grown, "Growing node pools");
            match self.init_with(grown, alloc) {
                Ok(()) => return true,
                Err(err) => {
                    warn!(total = self.total, %err, "Node pool growth failed, keeping current pools");
                    self.ceiling = self.total;
                }
            }
        } else if starved {
            warn!(total = self.total, "Node pools ran out of nodes at their ceiling");
        }

        for pool in &mut self.pools {
            pool.reset();
        }
        false
    }

    pub fn pools(&self) -> &[TriNodePool] {
        &self.pools
    }

    pub fn pools_mut(&mut self) -> &mut [TriNodePool] {
        &mut self.pools
    }

    /// Number of pools (workers).
    #[inline]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Current pass budget in nodes.
    #[inline]
    pub const fn total_size(&self) -> usize {
        self.total
    }

    #[inline]
    pub const fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Nodes handed out across all pools since the last reset.
    pub fn allocated(&self) -> usize {
        self.pools.iter().map(TriNodePool::allocated).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_advances_in_pairs_until_exhausted() {
        let mut pool = TriNodePool::try_new(4).unwrap();
        assert_eq!(pool.capacity(), 4);

        let first = pool.allocate().unwrap();
        let second = pool.allocate().unwrap();
        assert_ne!(first, second);
        assert_eq!(pool.allocated(), 4);
        assert!(pool.is_exhausted());
        assert!(!pool.is_starved());

        assert_eq!(pool.allocate(), None);
        assert!(pool.is_starved());
        assert_eq!(pool.allocated(), 4);
    }

    #[test]
    fn capacity_two_fails_on_second_request() {
        let mut pool = TriNodePool::try_new(2).unwrap();
        assert!(pool.allocate().is_some());
        assert!(pool.allocate().is_none());
    }

    #[test]
    fn odd_capacity_rounds_up() {
        let pool = TriNodePool::try_new(5).unwrap();
        assert_eq!(pool.capacity(), 6);
    }

    #[test]
    fn reset_clears_handed_out_nodes() {
        let mut pool = TriNodePool::try_new(4).unwrap();
        let pair = pool.allocate().unwrap();
        let crate::node::NodeId::Pooled(slot) = pair.left() else {
            unreachable!()
        };
        pool.node_mut(slot).children = Some(ChildPair::new(2));
        assert!(!pool.reserve(8));
        assert!(pool.is_starved());

        pool.reset();
        assert_eq!(pool.allocated(), 0);
        assert!(!pool.is_starved());
        assert!(pool.node(slot).is_leaf());
    }

    #[test]
    fn reserve_does_not_consume() {
        let mut pool = TriNodePool::try_new(4).unwrap();
        assert!(pool.reserve(4));
        assert_eq!(pool.remaining(), 4);
        assert!(!pool.reserve(6));
    }

    #[test]
    fn per_worker_size_has_a_floor() {
        assert_eq!(per_worker_size(1200, 1), 1200);
        assert_eq!(per_worker_size(1200, 2), 600);
        // Eight workers would get 150 each; the floor is a third.
        assert_eq!(per_worker_size(1200, 8), 400);
        assert_eq!(per_worker_size(7, 1), 8);
    }

    #[test]
    fn pools_grow_after_starvation() {
        let mut pools = TriNodePools::new(2, 8, 32).unwrap();
        assert_eq!(pools.len(), 2);
        assert_eq!(pools.total_size(), 8);

        assert!(!pools.reset_all());

        let pool = &mut pools.pools_mut()[1];
        while pool.allocate().is_some() {}
        assert!(pools.reset_all());
        assert_eq!(pools.total_size(), 16);
        assert_eq!(pools.allocated(), 0);

        for pool in pools.pools_mut() {
            while pool.allocate().is_some() {}
        }
        assert!(pools.reset_all());
        assert_eq!(pools.total_size(), 32);

        // At the ceiling starvation only resets.
        let pool = &mut pools.pools_mut()[0];
        while pool.allocate().is_some() {}
        assert!(!pools.reset_all());
        assert_eq!(pools.total_size(), 32);
        assert_eq!(pools.allocated(), 0);
    }

    fn fail_above(limit: usize) -> impl FnMut(usize) -> Result<TriNodePool> {
        move |size| {
            if size > limit {
                Err(Error::PoolAllocation { requested: size })
            } else {
                TriNodePool::try_new(size)
            }
        }
    }

    #[test]
    fn failed_allocation_retries_smaller_and_lowers_ceiling() {
        let mut pools = TriNodePools::new(1, 64, 4096).unwrap();

        // 1024 and 768 fail, 576 fits.
        pools.init_with(1024, fail_above(600)).unwrap();
        assert_eq!(pools.total_size(), 576);
        assert_eq!(pools.ceiling(), 576);
        assert_eq!(pools.pools()[0].capacity(), 576);
    }

    #[test]
    fn failed_growth_keeps_current_pools() {
        let mut pools = TriNodePools::new(2, 16, 1024).unwrap();
        let pool = &mut pools.pools_mut()[0];
        while pool.allocate().is_some() {}

        assert!(!pools.reset_all_with(fail_above(0)));
        assert_eq!(pools.len(), 2);
        assert_eq!(pools.total_size(), 16);
        assert_eq!(pools.ceiling(), 16);
        assert_eq!(pools.allocated(), 0);
        assert!(pools.pools().iter().all(|pool| !pool.is_starved()));

        // The pinned ceiling stops further attempts.
        let pool = &mut pools.pools_mut()[1];
        while pool.allocate().is_some() {}
        assert!(!pools.reset_all());
        assert_eq!(pools.total_size(), 16);
    }

    #[test]
    fn empty_budget_is_an_error() {
        assert!(matches!(
            TriNodePools::new(1, 0, 0),
            Err(Error::PoolAllocation { .. })
        ));
    }
}
