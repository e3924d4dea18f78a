//! Cross-domain register outputs.
//!
//! A wire is the output of a register owned by one domain and observed by the other. The owning
//! domain stages the next value during its clock edge and publishes it once every domain clocked at
//! the same instant has sampled its inputs, which gives the usual flip-flop semantics: an edge
//! always reads the pre-edge value of its peers.

use std::sync::Arc;

use parking_lot::Mutex;

/// Creates a wire whose register resets to `init`.
pub fn wire<T: Clone + Send>(init: T) -> (WireWriter<T>, WireReader<T>) {
    let shared = Arc::new(Mutex::new(init.clone()));
    (WireWriter { init: init.clone(), staged: init, shared: shared.clone() }, WireReader { shared })
}

/// Writing end of a wire, held by the owning domain.
#[derive(Debug)]
pub struct WireWriter<T> {
    init: T,
    staged: T,
    shared: Arc<Mutex<T>>,
}

impl<T: Clone> WireWriter<T> {
    /// Returns the value the register will hold after the current edge.
    pub fn get(&self) -> &T { &self.staged }

    /// Stages the next register value.
    pub fn set(&mut self, value: T) { self.staged = value; }

    /// Makes the staged value visible to the reader.
    pub fn publish(&self) { *self.shared.lock() = self.staged.clone(); }

    /// Asynchronously resets the register. The reset value is visible to the reader immediately.
    pub fn reset(&mut self) {
        self.staged = self.init.clone();
        self.publish();
    }
}

/// Reading end of a wire, held by the observing domain.
#[derive(Debug)]
pub struct WireReader<T> {
    shared: Arc<Mutex<T>>,
}

impl<T: Clone> WireReader<T> {
    /// Returns the last published value.
    pub fn get(&self) -> T { self.shared.lock().clone() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_value_is_invisible_until_published() {
        let (mut w, r) = wire(0u32);
        w.set(5);
        assert_eq!(*w.get(), 5);
        assert_eq!(r.get(), 0);
        w.publish();
        assert_eq!(r.get(), 5);
    }

    #[test]
    fn reset_is_visible_immediately() {
        let (mut w, r) = wire(1u8);
        w.set(9);
        w.publish();
        assert_eq!(r.get(), 9);
        w.reset();
        assert_eq!(*w.get(), 1);
        assert_eq!(r.get(), 1);
    }
}
