//! Fenwick (binary indexed) tree over row counts
//!
//! Supports point updates, prefix sums and "how many leading items fit under
//! this offset" in O(log n), which is all the virtualizer needs to map between
//! block indices and absolute row offsets.

#[derive(Debug, Clone, Default)]
pub struct Fenwick {
    /// 1-based tree; `tree[0]` is unused
    tree: Vec<u64>,
}

impl Fenwick {
    /// Build in O(n) from item values
    pub fn from_values(values: &[u64]) -> Self {
        let n = values.len();
        let mut tree = vec![0u64; n + 1];
        tree[1..].copy_from_slice(values);
        for i in 1..=n {
            let parent = i + (i & i.wrapping_neg());
            if parent <= n {
                tree[parent] += tree[i];
            }
        }
        Self { tree }
    }

    pub fn len(&self) -> usize {
        self.tree.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add `delta` to item `index` (0-based)
    pub fn add(&mut self, index: usize, delta: i64) {
        let n = self.len();
        let mut i = index + 1;
        while i <= n {
            self.tree[i] = self.tree[i].wrapping_add_signed(delta);
            i += i & i.wrapping_neg();
        }
    }

    /// Sum of the first `count` items
    pub fn prefix(&self, count: usize) -> u64 {
        let mut i = count.min(self.len());
        let mut sum = 0;
        while i > 0 {
            sum += self.tree[i];
            i -= i & i.wrapping_neg();
        }
        sum
    }

    pub fn total(&self) -> u64 {
        self.prefix(self.len())
    }

    /// Largest `count` such that `prefix(count) <= target`
    pub fn count_within(&self, target: u64) -> usize {
        let n = self.len();
        if n == 0 {
            return 0;
        }
        let mut pos = 0;
        let mut remaining = target;
        let mut step = 1usize << (usize::BITS - 1 - n.leading_zeros());
        while step > 0 {
            let next = pos + step;
            if next <= n && self.tree[next] <= remaining {
                pos = next;
                remaining -= self.tree[next];
            }
            step >>= 1;
        }
        pos
    }
}
