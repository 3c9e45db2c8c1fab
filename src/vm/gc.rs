use gc::{Gc, GcCell, Trace};

/// A garbage-collected cell with interior mutability
pub type GcShared<T> = Gc<GcCell<T>>;

pub fn shared<T: Trace>(x: T) -> GcShared<T> {
    Gc::new(GcCell::new(x))
}
