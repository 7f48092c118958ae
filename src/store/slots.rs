//! Record storage with a live list and a free list threaded through one vector.
//!
//! Every slot is either `Live` (linked into the live list in creation order) or
//! `Free` (linked into a LIFO free list). Lookups only ever succeed on `Live`
//! slots, so a handle to a released record fails instead of reading stale data.

#[derive(Debug)]
enum Slot<T> {
    Live {
        value: T,
        prev: Option<u32>,
        next: Option<u32>,
    },
    Free {
        next_free: Option<u32>,
    },
}

#[derive(Debug)]
pub struct SlotTable<T> {
    slots: Vec<Slot<T>>,
    head: Option<u32>,
    tail: Option<u32>,
    free_head: Option<u32>,
    live: usize,
}

impl<T> Default for SlotTable<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            head: None,
            tail: None,
            free_head: None,
            live: 0,
        }
    }
}

impl<T> SlotTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`, reusing the most recently freed slot if there is one,
    /// and appends it to the tail of the live list.
    pub fn insert(&mut self, value: T) -> u32 {
        let prev = self.tail;
        let live = Slot::Live {
            value,
            prev,
            next: None,
        };

        let index = match self.free_head {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                let Slot::Free { next_free } = *slot else {
                    panic!("free list entry {index} is not tagged free");
                };
                self.free_head = next_free;
                *slot = live;
                index
            }
            None => {
                self.slots.push(live);
                (self.slots.len() - 1) as u32
            }
        };

        match prev {
            Some(tail) => self.set_next(tail, Some(index)),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.live += 1;
        index
    }

    /// Unlinks a live slot and pushes it onto the free list.
    pub fn remove(&mut self, index: u32) -> Option<T> {
        let slot = self.slots.get_mut(index as usize)?;
        if !matches!(slot, Slot::Live { .. }) {
            return None;
        }

        let freed = std::mem::replace(
            slot,
            Slot::Free {
                next_free: self.free_head,
            },
        );
        let Slot::Live { value, prev, next } = freed else {
            return None;
        };

        match prev {
            Some(prev) => self.set_next(prev, next),
            None => self.head = next,
        }
        match next {
            Some(next) => self.set_prev(next, prev),
            None => self.tail = prev,
        }

        self.free_head = Some(index);
        self.live -= 1;
        Some(value)
    }

    pub fn get(&self, index: u32) -> Option<&T> {
        match self.slots.get(index as usize)? {
            Slot::Live { value, .. } => Some(value),
            Slot::Free { .. } => None,
        }
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        match self.slots.get_mut(index as usize)? {
            Slot::Live { value, .. } => Some(value),
            Slot::Free { .. } => None,
        }
    }

    pub fn is_live(&self, index: u32) -> bool {
        self.get(index).is_some()
    }

    pub fn first(&self) -> Option<u32> {
        self.head
    }

    /// Live indices in list order.
    pub fn indices(&self) -> Vec<u32> {
        self.iter().map(|(index, _)| index).collect()
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            table: self,
            cursor: self.head,
        }
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Drops every slot, live and free.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = None;
        self.tail = None;
        self.free_head = None;
        self.live = 0;
    }

    fn set_next(&mut self, index: u32, value: Option<u32>) {
        if let Some(Slot::Live { next, .. }) = self.slots.get_mut(index as usize) {
            *next = value;
        }
    }

    fn set_prev(&mut self, index: u32, value: Option<u32>) {
        if let Some(Slot::Live { prev, .. }) = self.slots.get_mut(index as usize) {
            *prev = value;
        }
    }
}

pub struct Iter<'a, T> {
    table: &'a SlotTable<T>,
    cursor: Option<u32>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (u32, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        match self.table.slots.get(index as usize)? {
            Slot::Live { value, next, .. } => {
                self.cursor = *next;
                Some((index, value))
            }
            Slot::Free { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_links_in_order() {
        let mut table = SlotTable::new();
        let a = table.insert("a");
        let b = table.insert("b");
        let c = table.insert("c");
        assert_eq!(table.indices(), vec![a, b, c]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_remove_middle_head_tail() {
        let mut table = SlotTable::new();
        let a = table.insert(1);
        let b = table.insert(2);
        let c = table.insert(3);

        assert_eq!(table.remove(b), Some(2));
        assert_eq!(table.indices(), vec![a, c]);
        assert_eq!(table.remove(a), Some(1));
        assert_eq!(table.indices(), vec![c]);
        assert_eq!(table.remove(c), Some(3));
        assert!(table.indices().is_empty());
        assert!(table.is_empty());
        assert_eq!(table.first(), None);
    }

    #[test]
    fn test_freed_slot_is_not_live() {
        let mut table = SlotTable::new();
        let a = table.insert(10);
        table.remove(a);
        assert_eq!(table.get(a), None);
        assert_eq!(table.remove(a), None);
        assert_eq!(table.get(999), None);
    }

    #[test]
    fn test_free_list_reuse_is_lifo() {
        let mut table = SlotTable::new();
        let a = table.insert('a');
        let b = table.insert('b');
        table.remove(a);
        table.remove(b);

        assert_eq!(table.insert('x'), b);
        assert_eq!(table.insert('y'), a);
        assert_eq!(table.insert('z'), 2);
        assert_eq!(table.indices(), vec![b, a, 2]);
    }

    #[test]
    fn test_clear() {
        let mut table = SlotTable::new();
        let a = table.insert(());
        table.insert(());
        table.remove(a);
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.insert(()), 0);
    }
}
