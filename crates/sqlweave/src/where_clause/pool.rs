//! A small freelist of reusable buffers.
//!
//! Each [`WhereCompiler`](super::WhereCompiler) owns one pool. Buffers are
//! handed out as [`Pooled`] guards and go back to the freelist when the guard
//! drops, including when compilation bails out with an error.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};

/// Objects that can be wiped for reuse.
pub trait Recycle: Default {
    fn recycle(&mut self);
}

impl Recycle for String {
    fn recycle(&mut self) {
        self.clear();
    }
}

/// Freelist of `T`. Not `Sync`: share a compiler across threads by cloning its config instead.
#[derive(Debug)]
pub struct ObjectPool<T: Recycle> {
    free: RefCell<Vec<T>>,
}

impl<T: Recycle> ObjectPool<T> {
    /// Create a pool holding `capacity` ready objects.
    pub fn new(capacity: usize) -> Self {
        Self {
            free: RefCell::new((0..capacity).map(|_| T::default()).collect()),
        }
    }

    /// Take an object, creating one if the freelist is empty.
    ///
    /// The object is recycled before it is handed out.
    pub fn acquire(&self) -> Pooled<'_, T> {
        let mut item = self.free.borrow_mut().pop().unwrap_or_default();
        item.recycle();
        Pooled {
            item: Some(item),
            pool: self,
        }
    }

    /// Number of objects currently on the freelist.
    pub fn available(&self) -> usize {
        self.free.borrow().len()
    }

    fn release(&self, item: T) {
        self.free.borrow_mut().push(item);
    }
}

/// An object on loan from an [`ObjectPool`].
#[derive(Debug)]
pub struct Pooled<'p, T: Recycle> {
    item: Option<T>,
    pool: &'p ObjectPool<T>,
}

impl<T: Recycle> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // `item` is only taken in `drop`.
        self.item.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl<T: Recycle> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.item.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl<T: Recycle> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.release(item);
        }
    }
}
