//! A max-heap over a dense collection of indexed values.
//!
//! The heap is backed by a vector of values which stays dense --- every index created keeps a
//! value slot --- while membership of the heap itself comes and goes.
//! A companion vector tracks where on the heap each index currently sits, so the value of an
//! index may be revised in place and the heap repaired locally.
//!
//! The structure is used as the store of atom activities: every atom has an activity, atoms
//! without a value sit on the heap, and a decision takes the most active of these.
//! Learned clause activities are kept the same way.
//!
//! ```rust
//! # use marten_sat::generic::index_heap::IndexHeap;
//! let mut heap = IndexHeap::default();
//!
//! heap.expand_to(3);
//! heap.revalue(0, 10_u64);
//! heap.revalue(2, 30_u64);
//!
//! heap.activate(0);
//! heap.activate(2);
//!
//! assert_eq!(heap.pop_max(), Some(2));
//! assert_eq!(heap.pop_max(), Some(0));
//! assert_eq!(heap.pop_max(), None);
//! ```

/// A max-heap over indexed values, with values revisable in place.
#[derive(Default)]
pub struct IndexHeap<V: PartialOrd + Default> {
    /// The value of every index, dense.
    values: Vec<V>,

    /// The heap itself: a shuffle of the active indices.
    heap: Vec<usize>,

    /// For each index, its current position on the heap, if active.
    position: Vec<Option<usize>>,
}

impl<V: PartialOrd + Default> IndexHeap<V> {
    /// Ensures value slots exist for every index below `count`.
    /// Fresh slots take the default value and are not active on the heap.
    pub fn expand_to(&mut self, count: usize) {
        while self.values.len() < count {
            self.values.push(V::default());
            self.position.push(None);
        }
    }

    /// Drops all indices at or above `count`, both from the heap and the value store.
    pub fn shrink_to(&mut self, count: usize) {
        if count >= self.values.len() {
            return;
        }
        self.values.truncate(count);
        self.position.truncate(count);
        self.heap.retain(|index| *index < count);
        for heap_index in 0..self.heap.len() {
            self.position[self.heap[heap_index]] = Some(heap_index);
        }
        self.heapify();
    }

    /// The count of indexed values.
    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// The value at `index`.
    pub fn value_at(&self, index: usize) -> &V {
        &self.values[index]
    }

    /// Sets the value at `index`, without repairing the heap.
    pub fn revalue(&mut self, index: usize, value: V) {
        self.values[index] = value;
    }

    /// True if `index` is active on the heap.
    pub fn active(&self, index: usize) -> bool {
        self.position[index].is_some()
    }

    /// Places `index` on the heap, or repairs its position if already present.
    pub fn activate(&mut self, index: usize) {
        match self.position[index] {
            None => {
                let heap_index = self.heap.len();
                self.heap.push(index);
                self.position[index] = Some(heap_index);
                self.sift_up(heap_index);
            }
            Some(heap_index) => {
                self.sift_up(heap_index);
                self.sift_down(heap_index);
            }
        }
    }

    /// Repairs the position of `index`, if active.
    pub fn heapify_if_active(&mut self, index: usize) {
        if let Some(heap_index) = self.position[index] {
            self.sift_up(heap_index);
            self.sift_down(heap_index);
        }
    }

    /// Rebuilds the heap from scratch.
    pub fn heapify(&mut self) {
        for heap_index in (0..self.heap.len() / 2).rev() {
            self.sift_down(heap_index);
        }
    }

    /// The active index with the greatest value, if any.
    pub fn peek_max(&self) -> Option<usize> {
        self.heap.first().copied()
    }

    /// Removes and returns the active index with the greatest value, if any.
    pub fn pop_max(&mut self) -> Option<usize> {
        let max = self.peek_max()?;
        self.remove(max);
        Some(max)
    }

    /// Removes `index` from the heap, if active.
    /// Returns true if `index` was removed, false otherwise.
    pub fn remove(&mut self, index: usize) -> bool {
        let Some(heap_index) = self.position[index] else {
            return false;
        };
        let last = self.heap.len() - 1;
        self.heap.swap(heap_index, last);
        self.heap.pop();
        self.position[index] = None;
        if heap_index <= last && heap_index < self.heap.len() {
            let moved = self.heap[heap_index];
            self.position[moved] = Some(heap_index);
            self.sift_down(heap_index);
            self.sift_up(heap_index);
        }
        true
    }

    /// Applies `f` to every value, without repairing the heap.
    ///
    /// Sound for order-preserving revisions, such as scaling all activities; otherwise call
    /// [heapify](IndexHeap::heapify) afterwards.
    pub fn apply_to_all(&mut self, f: impl Fn(&V) -> V) {
        for value in self.values.iter_mut() {
            *value = f(value);
        }
    }

    fn sift_up(&mut self, mut heap_index: usize) {
        while heap_index > 0 {
            let parent = (heap_index - 1) / 2;
            if self.values[self.heap[parent]] >= self.values[self.heap[heap_index]] {
                break;
            }
            self.swap_positions(heap_index, parent);
            heap_index = parent;
        }
    }

    fn sift_down(&mut self, mut heap_index: usize) {
        loop {
            let left = 2 * heap_index + 1;
            if left >= self.heap.len() {
                break;
            }
            let mut largest = heap_index;
            if self.values[self.heap[left]] > self.values[self.heap[largest]] {
                largest = left;
            }
            let right = left + 1;
            if right < self.heap.len()
                && self.values[self.heap[right]] > self.values[self.heap[largest]]
            {
                largest = right;
            }
            if largest == heap_index {
                break;
            }
            self.swap_positions(heap_index, largest);
            heap_index = largest;
        }
    }

    fn swap_positions(&mut self, a: usize, b: usize) {
        self.position[self.heap[a]] = Some(b);
        self.position[self.heap[b]] = Some(a);
        self.heap.swap(a, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_simple() {
        let mut heap = IndexHeap::default();
        heap.expand_to(7);
        for (index, value) in [(6, 10), (5, 20), (4, 30), (1, 60), (0, 70)] {
            heap.revalue(index, value);
            heap.activate(index);
        }

        assert_eq!(heap.pop_max(), Some(0));
        assert_eq!(heap.pop_max(), Some(1));
        assert_eq!(heap.pop_max(), Some(4));
        assert_eq!(heap.pop_max(), Some(5));
        assert_eq!(heap.pop_max(), Some(6));
        assert_eq!(heap.pop_max(), None);
    }

    #[test]
    fn heap_revalue() {
        let mut heap = IndexHeap::default();
        heap.expand_to(7);
        for (index, value) in [(6, 10), (4, 30), (1, 60), (0, 70)] {
            heap.revalue(index, value);
            heap.activate(index);
        }

        // Invert the order and repair.
        heap.revalue(0, 0);
        heap.revalue(1, 1);
        heap.revalue(4, 4);
        heap.revalue(6, 6);
        heap.heapify();

        assert_eq!(heap.pop_max(), Some(6));
        assert_eq!(heap.pop_max(), Some(4));
        assert_eq!(heap.pop_max(), Some(1));
        assert_eq!(heap.pop_max(), Some(0));
    }

    #[test]
    fn heap_remove() {
        let mut heap = IndexHeap::default();
        heap.expand_to(7);
        for index in [0, 1, 4, 5, 6] {
            heap.revalue(index, index);
            heap.activate(index);
        }

        assert!(heap.remove(4));
        assert!(!heap.remove(4));
        assert!(heap.remove(6));

        heap.revalue(4, 2);
        heap.activate(4);

        assert_eq!(heap.pop_max(), Some(5));
        assert_eq!(heap.pop_max(), Some(4));
        assert_eq!(heap.pop_max(), Some(1));
        assert_eq!(heap.pop_max(), Some(0));
    }

    #[test]
    fn heap_shrink() {
        let mut heap = IndexHeap::default();
        heap.expand_to(10);
        for index in 0..10 {
            heap.revalue(index, index);
            heap.activate(index);
        }

        heap.shrink_to(4);
        assert_eq!(heap.count(), 4);
        assert_eq!(heap.pop_max(), Some(3));
        assert_eq!(heap.pop_max(), Some(2));
        assert_eq!(heap.pop_max(), Some(1));
        assert_eq!(heap.pop_max(), Some(0));
        assert_eq!(heap.pop_max(), None);
    }
}
