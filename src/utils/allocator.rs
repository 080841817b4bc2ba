use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Handle to an object slot, tagged with the generation it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl ObjectId {
    pub const NULL: ObjectId = ObjectId {
        index: u32::MAX,
        generation: 0,
    };

    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::NULL
    }
}

/// Generational arena: removed slots are recycled, stale handles stop resolving.
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    generations: Vec<u32>,
    free_list: VecDeque<u32>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: VecDeque::new(),
            live: 0,
        }
    }

    pub fn insert(&mut self, item: T) -> ObjectId {
        self.live += 1;
        if let Some(index) = self.free_list.pop_front() {
            self.slots[index as usize] = Some(item);
            return ObjectId::new(index, self.generations[index as usize]);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Some(item));
        self.generations.push(0);
        ObjectId::new(index, 0)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: ObjectId) -> Option<&T> {
        if !self.is_current(id) {
            return None;
        }
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut T> {
        if !self.is_current(id) {
            return None;
        }
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Borrows two distinct slots mutably, in argument order.
    pub fn get2_mut(&mut self, id_a: ObjectId, id_b: ObjectId) -> Option<(&mut T, &mut T)> {
        if id_a.index() == id_b.index() || !self.is_current(id_a) || !self.is_current(id_b) {
            return None;
        }

        let flipped = id_a.index() > id_b.index();
        let (low, high) = if flipped { (id_b, id_a) } else { (id_a, id_b) };

        let (left, right) = self.slots.split_at_mut(high.index());
        let low_slot = left.get_mut(low.index()).and_then(Option::as_mut)?;
        let high_slot = right.first_mut().and_then(Option::as_mut)?;

        if flipped {
            Some((high_slot, low_slot))
        } else {
            Some((low_slot, high_slot))
        }
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<T> {
        if !self.is_current(id) {
            return None;
        }
        let taken = self.slots.get_mut(id.index())?.take()?;
        self.generations[id.index()] = self.generations[id.index()].wrapping_add(1);
        self.free_list.push_back(id.index() as u32);
        self.live -= 1;
        Some(taken)
    }

    /// Live entries paired with their handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref()
                .map(|item| (ObjectId::new(index as u32, self.generations[index]), item))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ObjectId, &mut T)> + '_ {
        let generations = &self.generations;
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(move |(index, slot)| {
                slot.as_mut()
                    .map(|item| (ObjectId::new(index as u32, generations[index]), item))
            })
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn is_current(&self, id: ObjectId) -> bool {
        self.generations
            .get(id.index())
            .is_some_and(|generation| *generation == id.generation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_handles_stop_resolving_after_removal() {
        let mut arena = Arena::new();
        let first = arena.insert("a");
        assert_eq!(arena.remove(first), Some("a"));

        let second = arena.insert("b");
        assert_eq!(second.index(), first.index());
        assert_ne!(second.generation(), first.generation());
        assert!(arena.get(first).is_none());
        assert_eq!(arena.get(second), Some(&"b"));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn get2_mut_respects_argument_order() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);

        let (high, low) = arena.get2_mut(b, a).expect("distinct live slots");
        assert_eq!((*high, *low), (2, 1));
        *high = 20;
        assert_eq!(arena.get(b), Some(&20));
        assert!(arena.get2_mut(a, a).is_none());
    }
}
