use std::collections::HashMap;
use std::hash::Hash;

use newengine_bridge::{KeyPhase, PointerPhase, SurfaceHandle};
use winit::event::{ElementState, TouchPhase};
use winit::window::WindowId;

/// Hands out small stable integers for opaque winit identifiers (device ids, physical keys).
pub struct Interner<K> {
    map: HashMap<K, i32>,
    next: i32,
}

impl<K: Hash + Eq> Interner<K> {
    #[inline]
    pub fn starting_at(first: i32) -> Self {
        Self {
            map: HashMap::new(),
            next: first,
        }
    }

    pub fn intern(&mut self, key: K) -> i32 {
        if let Some(&id) = self.map.get(&key) {
            return id;
        }
        let id = self.next;
        self.next += 1;
        self.map.insert(key, id);
        id
    }

    #[inline]
    pub fn contains_id(&self, id: i32) -> bool {
        self.map.values().any(|&v| v == id)
    }

    #[inline]
    pub fn ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.map.values().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[inline]
pub fn surface_handle(id: WindowId) -> SurfaceHandle {
    SurfaceHandle(u64::from(id))
}

#[inline]
pub fn button_phase(state: ElementState) -> PointerPhase {
    match state {
        ElementState::Pressed => PointerPhase::Down,
        ElementState::Released => PointerPhase::Up,
    }
}

#[inline]
pub fn touch_phase(phase: TouchPhase) -> PointerPhase {
    match phase {
        TouchPhase::Started => PointerPhase::Down,
        TouchPhase::Moved => PointerPhase::Move,
        TouchPhase::Ended => PointerPhase::Up,
        TouchPhase::Cancelled => PointerPhase::Cancel,
    }
}

#[inline]
pub fn key_phase(state: ElementState) -> KeyPhase {
    match state {
        ElementState::Pressed => KeyPhase::Down,
        ElementState::Released => KeyPhase::Up,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interner_is_stable() {
        let mut i = Interner::starting_at(1);
        assert_eq!(i.intern("mouse"), 1);
        assert_eq!(i.intern("pen"), 2);
        assert_eq!(i.intern("mouse"), 1);
        assert!(i.contains_id(2));
        assert!(!i.contains_id(3));
        assert_eq!(i.len(), 2);
    }

    #[test]
    fn phases_map_one_to_one() {
        assert_eq!(button_phase(ElementState::Pressed), PointerPhase::Down);
        assert_eq!(touch_phase(TouchPhase::Cancelled), PointerPhase::Cancel);
        assert_eq!(key_phase(ElementState::Released), KeyPhase::Up);
    }
}
