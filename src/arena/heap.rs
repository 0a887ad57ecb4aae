use super::{Arena, Product, Stats};

/// Allocates every object directly from the global allocator.
#[derive(Debug, Default)]
pub struct Heap {
    stats: Stats,
}

impl Arena for Heap {
    fn allocate<T: 'static>(&mut self, product: Product, value: T) -> Box<T> {
        self.stats.get_mut(product).allocated += 1;
        Box::new(value)
    }

    fn release<T: ?Sized + 'static>(&mut self, product: Product, cell: Box<T>) {
        self.stats.get_mut(product).released += 1;
        drop(cell);
    }

    fn disown<T: ?Sized + 'static>(&mut self, product: Product, cell: Box<T>) -> Box<T> {
        self.stats.get_mut(product).disowned += 1;
        cell
    }

    fn stats(&self) -> &Stats { &self.stats }
}
