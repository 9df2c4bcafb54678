//! Recency List Module
//!
//! Doubly linked list stored in a slot arena, linked by integer indices.
//!
//! ```text
//!   slot 0 (HEAD) <-> [most recent] <-> ... <-> [least recent] <-> slot 1 (TAIL)
//! ```
//!
//! The two sentinel slots never move and never hold a value, so every
//! detach/attach has both neighbours present. Freed slots are kept on a
//! free list and reused by the next `push_front`.
//!
//! All operations except `iter`, `clear` and `debug_validate_invariants`
//! are O(1).

const HEAD: usize = 0;
const TAIL: usize = 1;

// == Handle ==
/// Stable reference to a node in a [`RecencyList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(usize);

impl Handle {
    /// Returns the underlying slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

// == Recency Order ==
/// Read-only view of the least-recent end, used by eviction policies.
pub trait RecencyOrder {
    /// Handle of the least recently used node, if any.
    fn least_recent(&self) -> Option<Handle>;
}

#[derive(Debug)]
struct Node<T> {
    value: Option<T>,
    prev: usize,
    next: usize,
}

impl<T> Node<T> {
    fn sentinel(prev: usize, next: usize) -> Self {
        Self {
            value: None,
            prev,
            next,
        }
    }
}

// == Recency List ==
/// Arena-backed doubly linked list ordered from most to least recent.
#[derive(Debug)]
pub struct RecencyList<T> {
    nodes: Vec<Node<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecencyList<T> {
    // == Constructor ==
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` nodes.
    ///
    /// Panics like [`Vec::with_capacity`] if the reservation is too large;
    /// callers with untrusted sizes should bound `capacity` first.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.saturating_add(2));
        nodes.push(Node::sentinel(HEAD, TAIL));
        nodes.push(Node::sentinel(HEAD, TAIL));
        Self {
            nodes,
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `handle` refers to a live node.
    pub fn contains(&self, handle: Handle) -> bool {
        self.is_occupied(handle.0)
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.nodes.get(handle.0).and_then(|node| node.value.as_ref())
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.nodes
            .get_mut(handle.0)
            .and_then(|node| node.value.as_mut())
    }

    // == Push Front ==
    /// Inserts `value` as the most recent node and returns its handle.
    pub fn push_front(&mut self, value: T) -> Handle {
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx].value = Some(value);
                idx
            }
            None => {
                self.nodes.push(Node {
                    value: Some(value),
                    prev: HEAD,
                    next: HEAD,
                });
                self.nodes.len() - 1
            }
        };
        self.attach_front(idx);
        self.len += 1;
        Handle(idx)
    }

    // == Move To Front ==
    /// Relinks an existing node at the most recent end.
    ///
    /// Returns `false` if `handle` is not a live node.
    pub fn move_to_front(&mut self, handle: Handle) -> bool {
        if !self.is_occupied(handle.0) {
            return false;
        }
        if self.nodes[HEAD].next != handle.0 {
            self.detach(handle.0);
            self.attach_front(handle.0);
        }
        true
    }

    // == Remove ==
    /// Detaches the node from any position and returns its value.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        if !self.is_occupied(handle.0) {
            return None;
        }
        self.detach(handle.0);
        self.len -= 1;
        self.free.push(handle.0);
        self.nodes[handle.0].value.take()
    }

    // == Back ==
    /// Returns the least recently used node without removing it.
    pub fn peek_back(&self) -> Option<(Handle, &T)> {
        let idx = self.nodes[TAIL].prev;
        self.nodes[idx].value.as_ref().map(|value| (Handle(idx), value))
    }

    /// Removes and returns the least recently used node.
    pub fn pop_back(&mut self) -> Option<(Handle, T)> {
        let idx = self.nodes[TAIL].prev;
        if idx == HEAD {
            return None;
        }
        self.remove(Handle(idx)).map(|value| (Handle(idx), value))
    }

    /// Iterates from most recent to least recent.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            current: self.nodes[HEAD].next,
        }
    }

    /// Drops every node; previously issued handles become invalid.
    pub fn clear(&mut self) {
        self.nodes.truncate(2);
        self.nodes[HEAD] = Node::sentinel(HEAD, TAIL);
        self.nodes[TAIL] = Node::sentinel(HEAD, TAIL);
        self.free.clear();
        self.len = 0;
    }

    /// Panics if the chain is inconsistent: a broken back link, a node
    /// missing from the chain, or a length mismatch.
    pub fn debug_validate_invariants(&self) {
        let mut seen = 0usize;
        let mut prev = HEAD;
        let mut current = self.nodes[HEAD].next;
        while current != TAIL {
            assert!(current > TAIL, "chain reached sentinel slot {current}");
            let node = &self.nodes[current];
            assert!(node.value.is_some(), "vacant slot {current} is linked");
            assert_eq!(node.prev, prev, "broken back link at slot {current}");
            seen += 1;
            assert!(seen <= self.len, "chain longer than len {}", self.len);
            prev = current;
            current = node.next;
        }
        assert_eq!(self.nodes[TAIL].prev, prev, "tail sentinel out of step");
        assert_eq!(seen, self.len, "reachable nodes differ from len");

        let occupied = self.nodes[2..]
            .iter()
            .filter(|node| node.value.is_some())
            .count();
        assert_eq!(occupied, self.len, "unreachable occupied slots");
        assert_eq!(
            self.nodes.len(),
            2 + self.len + self.free.len(),
            "slot accounting mismatch"
        );
    }

    fn is_occupied(&self, idx: usize) -> bool {
        idx > TAIL
            && self
                .nodes
                .get(idx)
                .is_some_and(|node| node.value.is_some())
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    fn attach_front(&mut self, idx: usize) {
        let old_first = self.nodes[HEAD].next;
        self.nodes[idx].prev = HEAD;
        self.nodes[idx].next = old_first;
        self.nodes[old_first].prev = idx;
        self.nodes[HEAD].next = idx;
    }
}

impl<T> RecencyOrder for RecencyList<T> {
    fn least_recent(&self) -> Option<Handle> {
        self.peek_back().map(|(handle, _)| handle)
    }
}

// == Iterator ==
/// Front-to-back iterator over a [`RecencyList`].
pub struct Iter<'a, T> {
    list: &'a RecencyList<T>,
    current: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Handle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == TAIL {
            return None;
        }
        let idx = self.current;
        let node = &self.list.nodes[idx];
        self.current = node.next;
        node.value.as_ref().map(|value| (Handle(idx), value))
    }
}
