// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

use std::{fmt, iter::FusedIterator, slice};

const NIL: u32 = u32::MAX;

/// The low bits of a generation hold a tag chosen at insertion.
pub(crate) const TAG_BITS: u32 = 8;

const TAG_MASK: u32 = (1 << TAG_BITS) - 1;

const OCCUPIED_BIT: u32 = 1 << TAG_BITS;

/// The index and generation of a slot. A slot ID only ever refers to the value it was returned
/// for: once that value is removed, the generation of the slot changes and the ID stops
/// matching.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct SlotId {
    index: u32,
    generation: u32,
}

impl SlotId {
    /// Returns an ID that never refers to a value, because its index is past the end of every
    /// map and its generation doesn't have the `OCCUPIED_BIT` set. It still carries `tag`.
    #[inline]
    pub(crate) const fn invalid_with_tag(tag: u32) -> Self {
        SlotId {
            index: NIL,
            generation: tag & TAG_MASK,
        }
    }

    #[inline]
    pub(crate) const fn index(self) -> u32 {
        self.index
    }

    #[inline]
    pub(crate) const fn tag(self) -> u32 {
        self.generation & TAG_MASK
    }
}

impl fmt::Debug for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.index == NIL {
            return f.pad("SlotId::INVALID");
        }

        write!(f, "SlotId({}v{})", self.index, self.generation >> (TAG_BITS + 1))
    }
}

pub(crate) struct SlotMap<V> {
    slots: Vec<Slot<V>>,
    len: u32,
    free_list_head: u32,
}

struct Slot<V> {
    generation: u32,
    inner: SlotInner<V>,
}

enum SlotInner<V> {
    Occupied(V),
    Vacant { next_free: u32 },
}

impl<V: fmt::Debug> fmt::Debug for SlotMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V> Default for SlotMap<V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<V> SlotMap<V> {
    #[inline]
    pub(crate) fn new() -> Self {
        SlotMap {
            slots: Vec::new(),
            len: 0,
            free_list_head: NIL,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> u32 {
        self.len
    }

    #[cfg(test)]
    #[inline]
    pub(crate) fn insert(&mut self, value: V) -> SlotId {
        self.insert_with_tag(value, 0)
    }

    pub(crate) fn insert_with_tag(&mut self, value: V, tag: u32) -> SlotId {
        debug_assert_eq!(tag & !TAG_MASK, 0);

        if let Some(slot) = self.slots.get_mut(self.free_list_head as usize) {
            let index = self.free_list_head;
            let generation = slot.generation.wrapping_add(OCCUPIED_BIT | tag);

            if let SlotInner::Vacant { next_free } = slot.inner {
                self.free_list_head = next_free;
            }

            slot.generation = generation;
            slot.inner = SlotInner::Occupied(value);
            self.len += 1;

            SlotId { index, generation }
        } else {
            let index = u32::try_from(self.slots.len())
                .ok()
                .filter(|&index| index < NIL)
                .unwrap_or_else(|| capacity_overflow());
            let generation = OCCUPIED_BIT | tag;

            self.slots.push(Slot {
                generation,
                inner: SlotInner::Occupied(value),
            });
            self.len += 1;

            SlotId { index, generation }
        }
    }

    pub(crate) fn remove(&mut self, id: SlotId) -> Option<V> {
        let slot = self.slots.get_mut(id.index as usize)?;

        if slot.generation != id.generation {
            return None;
        }

        // Clearing the tag and adding the `OCCUPIED_BIT` again carries into the counter bits.
        slot.generation = (id.generation & !TAG_MASK).wrapping_add(OCCUPIED_BIT);

        let inner = std::mem::replace(
            &mut slot.inner,
            SlotInner::Vacant {
                next_free: self.free_list_head,
            },
        );
        self.free_list_head = id.index;
        self.len -= 1;

        match inner {
            SlotInner::Occupied(value) => Some(value),
            SlotInner::Vacant { .. } => None,
        }
    }

    #[inline]
    pub(crate) fn get(&self, id: SlotId) -> Option<&V> {
        let slot = self.slots.get(id.index as usize)?;

        match &slot.inner {
            SlotInner::Occupied(value) if slot.generation == id.generation => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: SlotId) -> Option<&mut V> {
        let slot = self.slots.get_mut(id.index as usize)?;

        match &mut slot.inner {
            SlotInner::Occupied(value) if slot.generation == id.generation => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn contains(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    #[inline]
    pub(crate) fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.slots.iter().enumerate(),
        }
    }
}

pub(crate) struct Iter<'a, V> {
    inner: std::iter::Enumerate<slice::Iter<'a, Slot<V>>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (SlotId, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find_map(|(index, slot)| match &slot.inner {
            SlotInner::Occupied(value) => Some((
                SlotId {
                    index: index as u32,
                    generation: slot.generation,
                },
                value,
            )),
            SlotInner::Vacant { .. } => None,
        })
    }
}

impl<V> FusedIterator for Iter<'_, V> {}

#[cold]
fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_usage1() {
        let mut map = SlotMap::new();

        let x = map.insert(69);
        let y = map.insert(42);

        assert_eq!(map.get(x), Some(&69));
        assert_eq!(map.get(y), Some(&42));

        map.remove(x);

        let x2 = map.insert(12);

        assert_eq!(map.get(x2), Some(&12));
        assert_eq!(map.get(x), None);

        map.remove(y);
        map.remove(x2);

        assert_eq!(map.get(y), None);
        assert_eq!(map.get(x2), None);
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn basic_usage2() {
        let mut map = SlotMap::new();

        let x = map.insert(1);
        let y = map.insert(2);
        let z = map.insert(3);

        map.remove(y);

        let y2 = map.insert(20);

        assert_eq!(y2.index(), y.index());
        assert_eq!(map.get(y2), Some(&20));
        assert_eq!(map.get(y), None);

        map.remove(x);
        map.remove(z);

        let x2 = map.insert(10);
        let z2 = map.insert(30);

        assert_eq!(map.get(x2), Some(&10));
        assert_eq!(map.get(z2), Some(&30));
        assert_eq!(map.get(x), None);
        assert_eq!(map.get(z), None);
        assert_eq!(
            map.iter().map(|(_, &value)| value).collect::<Vec<_>>(),
            [30, 20, 10],
        );
    }

    #[test]
    fn removing_twice() {
        let mut map = SlotMap::new();

        let x = map.insert("x");

        assert_eq!(map.remove(x), Some("x"));
        assert_eq!(map.remove(x), None);
        assert_eq!(map.remove(SlotId::invalid_with_tag(0)), None);
        assert_eq!(map.remove(SlotId::invalid_with_tag(3)), None);
        assert!(map.get_mut(x).is_none());
    }

    #[test]
    fn tags() {
        let mut map = SlotMap::new();

        let x = map.insert_with_tag((), 5);
        assert_eq!(x.tag(), 5);

        map.remove(x);

        let y = map.insert_with_tag((), 3);
        assert_eq!(y.index(), x.index());
        assert_eq!(y.tag(), 3);
        assert!(!map.contains(x));
        assert!(map.contains(y));
    }
}
