/// Arena-backed doubly-linked recency sequence.
///
/// Entries live in a `Vec` and are addressed by stable `usize` slots, with
/// `prev`/`next` links threading them into a single list from most recently
/// used (head) to least recently used (tail). Slots freed by removal are
/// recycled through a free stack, so a slot index handed out to the index map
/// stays valid for as long as its entry is live.
///
/// The list stores only keys; values live in the concurrent index so that
/// lookups never need the lock guarding this structure.
pub(crate) struct RecencyList<K> {
    nodes: Vec<Node<K>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

struct Node<K> {
    /// `None` marks a vacant slot awaiting reuse.
    key: Option<K>,
    prev: Option<usize>,
    next: Option<usize>,
}

impl<K> RecencyList<K> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// The slot currently at the most-recently-used position, if any.
    pub(crate) fn head_slot(&self) -> Option<usize> {
        self.head
    }

    /// The key occupying `slot`, or `None` if the slot is vacant or out of
    /// bounds. Callers use this to detect that a slot observed without the
    /// lock has since been unlinked or recycled for a different key.
    pub(crate) fn key(&self, slot: usize) -> Option<&K> {
        self.nodes.get(slot).and_then(|node| node.key.as_ref())
    }

    /// Links a new entry at the most-recently-used position and returns its
    /// slot.
    pub(crate) fn push_front(&mut self, key: K) -> usize {
        let node = Node {
            key: Some(key),
            prev: None,
            next: self.head,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };

        if let Some(old_head) = self.head {
            self.nodes[old_head].prev = Some(slot);
        }
        self.head = Some(slot);
        if self.tail.is_none() {
            self.tail = Some(slot);
        }
        self.len += 1;
        slot
    }

    /// Moves a live entry to the most-recently-used position.
    pub(crate) fn move_to_front(&mut self, slot: usize) {
        if self.head == Some(slot) {
            return;
        }
        debug_assert!(self.key(slot).is_some());

        self.detach(slot);
        let old_head = self.head;
        self.nodes[slot].prev = None;
        self.nodes[slot].next = old_head;
        if let Some(old_head) = old_head {
            self.nodes[old_head].prev = Some(slot);
        }
        self.head = Some(slot);
        if self.tail.is_none() {
            self.tail = Some(slot);
        }
    }

    /// Unlinks and returns the least-recently-used entry.
    pub(crate) fn pop_back(&mut self) -> Option<(usize, K)> {
        let slot = self.tail?;
        let key = self.unlink(slot)?;
        Some((slot, key))
    }

    /// Unlinks the entry at `slot`, frees the slot for reuse, and returns its
    /// key. Returns `None` if the slot is already vacant.
    pub(crate) fn unlink(&mut self, slot: usize) -> Option<K> {
        let key = self.nodes.get_mut(slot)?.key.take()?;
        self.detach(slot);
        self.nodes[slot].prev = None;
        self.nodes[slot].next = None;
        self.free.push(slot);
        self.len -= 1;
        Some(key)
    }

    /// Splices the entry at `slot` out of the chain, fixing up its neighbors
    /// and the head/tail markers. The node itself keeps its links.
    fn detach(&mut self, slot: usize) {
        let prev = self.nodes[slot].prev;
        let next = self.nodes[slot].next;

        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => self.tail = prev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RecencyList;

    fn order<'a>(list: &'a RecencyList<&'a str>) -> Vec<&'a str> {
        let mut out = Vec::new();
        let mut cursor = list.head_slot();
        while let Some(slot) = cursor {
            out.push(*list.key(slot).unwrap());
            cursor = list.nodes[slot].next;
        }
        out
    }

    #[test]
    fn test_push_front_orders_most_recent_first() {
        let mut list = RecencyList::with_capacity(4);
        list.push_front("a");
        list.push_front("b");
        list.push_front("c");

        assert_eq!(list.len(), 3);
        assert_eq!(order(&list), ["c", "b", "a"]);
    }

    #[test]
    fn test_pop_back_returns_least_recent() {
        let mut list = RecencyList::with_capacity(4);
        list.push_front("a");
        list.push_front("b");

        assert_eq!(list.pop_back().map(|(_, k)| k), Some("a"));
        assert_eq!(list.pop_back().map(|(_, k)| k), Some("b"));
        assert_eq!(list.pop_back().map(|(_, k)| k), None);
        assert_eq!(list.len(), 0);
        assert!(list.head_slot().is_none());
    }

    #[test]
    fn test_move_to_front_promotes_tail() {
        let mut list = RecencyList::with_capacity(4);
        let a = list.push_front("a");
        list.push_front("b");
        list.push_front("c");

        list.move_to_front(a);

        assert_eq!(order(&list), ["a", "c", "b"]);
        assert_eq!(list.pop_back().map(|(_, k)| k), Some("b"));
    }

    #[test]
    fn test_move_to_front_on_head_is_noop() {
        let mut list = RecencyList::with_capacity(4);
        list.push_front("a");
        let b = list.push_front("b");

        list.move_to_front(b);

        assert_eq!(order(&list), ["b", "a"]);
    }

    #[test]
    fn test_unlink_middle_preserves_neighbors() {
        let mut list = RecencyList::with_capacity(4);
        list.push_front("a");
        let b = list.push_front("b");
        list.push_front("c");

        assert_eq!(list.unlink(b), Some("b"));
        assert_eq!(list.len(), 2);
        assert_eq!(order(&list), ["c", "a"]);

        assert_eq!(list.unlink(b), None);
    }

    #[test]
    fn test_slot_reuse_after_unlink() {
        let mut list = RecencyList::with_capacity(4);
        let a = list.push_front("a");
        list.push_front("b");

        list.unlink(a);
        let c = list.push_front("c");

        // The freed slot is recycled and the old key is gone.
        assert_eq!(c, a);
        assert_eq!(list.key(c), Some(&"c"));
        assert_eq!(order(&list), ["c", "b"]);
    }

    #[test]
    fn test_single_entry_head_and_tail_agree() {
        let mut list = RecencyList::with_capacity(2);
        let a = list.push_front("a");

        assert_eq!(list.head_slot(), Some(a));
        list.move_to_front(a);
        assert_eq!(list.head_slot(), Some(a));

        assert_eq!(list.pop_back().map(|(_, k)| k), Some("a"));
        assert!(list.head_slot().is_none());
        assert_eq!(list.len(), 0);
    }
}
