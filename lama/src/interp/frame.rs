//! Activation records
//!
//! A frame is a fixed-size array of slots plus a link to the frame it was
//! created under. Binder depths count hops along that link.

use super::Value;
use super::value::release;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared reference to a frame
pub type FrameRef = Rc<RefCell<Frame>>;

/// Storage for one record-introducing scope
#[derive(Debug)]
pub struct Frame {
    /// Slot values, all integer zero until written
    slots: Vec<Value>,
    /// Enclosing frame for lexical scoping
    parent: Option<FrameRef>,
}

impl Frame {
    /// Create a frame of `size` zeroed slots
    pub fn new(size: usize, parent: Option<FrameRef>) -> Self {
        Frame {
            slots: vec![Value::UNIT; size],
            parent,
        }
    }

    /// Wrap in Rc<RefCell<>>
    pub fn into_ref(self) -> FrameRef {
        Rc::new(RefCell::new(self))
    }

    pub fn get(&self, slot: usize) -> Option<Value> {
        self.slots.get(slot).cloned()
    }

    /// Overwrite a slot; returns false when the slot does not exist
    pub fn set(&mut self, slot: usize, value: Value) -> bool {
        match self.slots.get_mut(slot) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Value] {
        &self.slots
    }

    /// Empty the frame, handing back its slots and parent link
    pub(crate) fn take_contents(&mut self) -> (Vec<Value>, Option<FrameRef>) {
        (std::mem::take(&mut self.slots), self.parent.take())
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        let (slots, parent) = self.take_contents();
        release(slots, parent);
    }
}

/// Walk `depth` parent links up from `frame`
pub fn ancestor(frame: &FrameRef, depth: usize) -> Option<FrameRef> {
    let mut current = Rc::clone(frame);
    for _ in 0..depth {
        let parent = current.borrow().parent.clone()?;
        current = parent;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_frame_is_zeroed() {
        let frame = Frame::new(3, None);
        assert_eq!(frame.len(), 3);
        assert!(frame.slots().iter().all(|v| matches!(v, Value::Int(0))));
    }

    #[test]
    fn test_set_and_get() {
        let mut frame = Frame::new(2, None);
        assert!(frame.set(1, Value::Int(42)));
        assert_eq!(frame.get(1), Some(Value::Int(42)));
        assert!(!frame.set(2, Value::Int(1)));
        assert_eq!(frame.get(2), None);
    }

    #[test]
    fn test_ancestor_walk() {
        let root = Frame::new(1, None).into_ref();
        root.borrow_mut().set(0, Value::Int(7));
        let child = Frame::new(0, Some(Rc::clone(&root))).into_ref();
        let grandchild = Frame::new(0, Some(Rc::clone(&child))).into_ref();

        let found = ancestor(&grandchild, 2).unwrap();
        assert!(Rc::ptr_eq(&found, &root));
        assert_eq!(found.borrow().get(0), Some(Value::Int(7)));
        assert!(ancestor(&grandchild, 0).is_some_and(|f| Rc::ptr_eq(&f, &grandchild)));
        assert!(ancestor(&grandchild, 3).is_none());
    }

    #[test]
    fn test_drop_long_parent_chain() {
        let mut frame = Frame::new(1, None).into_ref();
        for _ in 0..200_000 {
            frame = Frame::new(1, Some(frame)).into_ref();
        }
        assert!(ancestor(&frame, 200_000).is_some());
        drop(frame);
    }

    #[test]
    fn test_take_contents_empties_frame() {
        let root = Frame::new(0, None).into_ref();
        let mut frame = Frame::new(2, Some(Rc::clone(&root)));
        let (slots, parent) = frame.take_contents();
        assert_eq!(slots.len(), 2);
        assert!(parent.is_some_and(|p| Rc::ptr_eq(&p, &root)));
        assert!(frame.is_empty());
        assert!(frame.take_contents().1.is_none());
    }

    #[test]
    fn test_empty_frame() {
        assert!(Frame::new(0, None).is_empty());
    }
}
