//! Generational Arena
//!
//! Slot map whose indices carry a generation, so an index that outlived its
//! slot is detected instead of aliasing whatever moved in afterwards.

/// Generational index for safe references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenIndex {
    pub index: u32,
    pub generation: u32,
}

/// Generational arena (slot map)
#[derive(Debug)]
pub struct GenArena<T> {
    items: Vec<Option<(T, u32)>>,
    free_list: Vec<u32>,
    generations: Vec<u32>,
    len: usize,
}

impl<T> GenArena<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            free_list: Vec::new(),
            generations: Vec::new(),
            len: 0,
        }
    }

    /// Insert item
    pub fn insert(&mut self, value: T) -> GenIndex {
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            let generation = self.generations[index as usize];
            self.items[index as usize] = Some((value, generation));
            GenIndex { index, generation }
        } else {
            let index = self.items.len() as u32;
            self.items.push(Some((value, 0)));
            self.generations.push(0);
            GenIndex { index, generation: 0 }
        }
    }

    /// Get item
    pub fn get(&self, idx: GenIndex) -> Option<&T> {
        self.items
            .get(idx.index as usize)
            .and_then(|opt| opt.as_ref())
            .filter(|(_, g)| *g == idx.generation)
            .map(|(val, _)| val)
    }

    /// Get mutable item
    pub fn get_mut(&mut self, idx: GenIndex) -> Option<&mut T> {
        self.items
            .get_mut(idx.index as usize)
            .and_then(|opt| opt.as_mut())
            .filter(|(_, g)| *g == idx.generation)
            .map(|(val, _)| val)
    }

    pub fn contains(&self, idx: GenIndex) -> bool {
        self.get(idx).is_some()
    }

    /// Remove item. The slot's generation is bumped so `idx` goes stale.
    pub fn remove(&mut self, idx: GenIndex) -> Option<T> {
        let slot = self.items.get_mut(idx.index as usize)?;
        match slot.take() {
            Some((val, g)) if g == idx.generation => {
                self.generations[idx.index as usize] = g.wrapping_add(1);
                self.free_list.push(idx.index);
                self.len -= 1;
                Some(val)
            }
            other => {
                *slot = other;
                None
            }
        }
    }

    /// Live items with their indices
    pub fn iter(&self) -> impl Iterator<Item = (GenIndex, &T)> {
        self.items.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref().map(|(val, generation)| {
                (
                    GenIndex {
                        index: i as u32,
                        generation: *generation,
                    },
                    val,
                )
            })
        })
    }

    /// Drop every item. Outstanding indices all go stale.
    pub fn clear(&mut self) {
        for (i, slot) in self.items.iter_mut().enumerate() {
            if slot.take().is_some() {
                self.generations[i] = self.generations[i].wrapping_add(1);
                self.free_list.push(i as u32);
            }
        }
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for GenArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
