use std::alloc::{self, Layout};
use std::collections::HashMap;
use std::ptr::{self, NonNull};

use super::{Arena, Product, Stats};

/// Recycles released memory blocks for later allocations of the same layout.
///
/// Released objects are dropped immediately,
/// but their blocks stay cached in the pool until it is [shrunk](Self::shrink) or dropped.
/// Zero-sized objects never allocate and are not cached.
#[derive(Debug, Default)]
pub struct Pool {
    free:  HashMap<Layout, Vec<NonNull<u8>>>,
    stats: Stats,
}

impl Pool {
    /// Returns the number of cached blocks.
    pub fn cached(&self) -> usize { self.free.values().map(Vec::len).sum() }

    /// Returns all cached blocks to the global allocator.
    pub fn shrink(&mut self) {
        for (layout, blocks) in self.free.drain() {
            for block in blocks {
                // SAFETY: every cached block was allocated by the global allocator
                // for a box of exactly `layout`, and its value has already been dropped.
                unsafe { alloc::dealloc(block.as_ptr(), layout) };
            }
        }
    }
}

impl Arena for Pool {
    fn allocate<T: 'static>(&mut self, product: Product, value: T) -> Box<T> {
        let counter = self.stats.get_mut(product);
        counter.allocated += 1;

        let layout = Layout::new::<T>();
        if layout.size() > 0 {
            if let Some(block) = self.free.get_mut(&layout).and_then(Vec::pop) {
                counter.recycled += 1;
                let ptr = block.cast::<T>().as_ptr();
                // SAFETY: the block was allocated by the global allocator for a box
                // whose layout equals `Layout::new::<T>()`, and it holds no live value.
                unsafe {
                    ptr.write(value);
                    return Box::from_raw(ptr);
                }
            }
        }

        Box::new(value)
    }

    fn release<T: ?Sized + 'static>(&mut self, product: Product, cell: Box<T>) {
        self.stats.get_mut(product).released += 1;

        let layout = Layout::for_value::<T>(&cell);
        if layout.size() == 0 {
            drop(cell);
            return;
        }

        let ptr = Box::into_raw(cell);
        // SAFETY: `ptr` comes from `Box::into_raw`, so it points to an initialized value
        // that nothing else can observe after this call.
        unsafe { ptr::drop_in_place(ptr) };

        let block = NonNull::new(ptr.cast::<u8>()).expect("Box::into_raw never returns null");
        self.free.entry(layout).or_default().push(block);
    }

    fn disown<T: ?Sized + 'static>(&mut self, product: Product, cell: Box<T>) -> Box<T> {
        self.stats.get_mut(product).disowned += 1;
        cell
    }

    fn stats(&self) -> &Stats { &self.stats }
}

impl Drop for Pool {
    fn drop(&mut self) { self.shrink() }
}
