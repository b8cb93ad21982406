use core::{
  ptr,
  sync::atomic::{
    AtomicPtr,
    Ordering,
  },
};

use spin::Mutex;

/// A slot holding an immutable value that writers replace wholesale and
/// readers observe with a single atomic load.
///
/// Readers never lock, so `load` may be called from a signal handler.
/// Replaced snapshots are retired rather than freed because a reader may
/// still hold a reference to them; they are released when the slot drops.
pub struct Published<T> {
  current: AtomicPtr<T>,
  writer: Mutex<Vec<*mut T>>,
}

impl<T> Published<T> {
  pub const fn empty() -> Self {
    Self {
      current: AtomicPtr::new(ptr::null_mut()),
      writer: Mutex::new(Vec::new()),
    }
  }

  pub fn load(&self) -> Option<&T> {
    let ptr = self.current.load(Ordering::Acquire);
    // SAFETY: non-null pointers come from Box::into_raw in `swap` and are
    // only freed in Drop, which needs exclusive access.
    unsafe { ptr.as_ref() }
  }

  /// Runs `f` with the writer lock held. `f` sees the current value and
  /// decides what happens next. `Err(e)` leaves the slot untouched, as does
  /// `Next::Keep`, which also retires nothing.
  pub fn update<E>(&self, f: impl FnOnce(Option<&T>) -> Result<Next<T>, E>) -> Result<(), E> {
    let mut retired = self.writer.lock();
    let next = match f(self.load())? {
      Next::Keep => return Ok(()),
      Next::Clear => ptr::null_mut(),
      Next::Replace(value) => Box::into_raw(Box::new(value)),
    };
    let prev = self.current.swap(next, Ordering::AcqRel);
    if !prev.is_null() {
      retired.push(prev);
    }
    Ok(())
  }

  #[cfg(test)]
  fn publish(&self, value: Option<T>) {
    let next = value.map_or(Next::Clear, Next::Replace);
    let _ = self.update::<()>(|_| Ok(next));
  }

  #[cfg(test)]
  fn retired(&self) -> usize {
    self.writer.lock().len()
  }
}

/// The outcome of an [`Published::update`] closure.
#[derive(Debug, PartialEq, Eq)]
pub enum Next<T> {
  Keep,
  Clear,
  Replace(T),
}

impl<T> Default for Published<T> {
  fn default() -> Self {
    Self::empty()
  }
}

impl<T> Drop for Published<T> {
  fn drop(&mut self) {
    let current = *self.current.get_mut();
    let retired = self.writer.get_mut();
    for ptr in retired.drain(..).chain((!current.is_null()).then_some(current)) {
      drop(unsafe { Box::from_raw(ptr) });
    }
  }
}

unsafe impl<T: Send + Sync> Sync for Published<T> {}
unsafe impl<T: Send> Send for Published<T> {}

#[cfg(test)]
mod tests {
  use std::{
    sync::{
      Arc,
      atomic::AtomicUsize,
    },
    thread,
  };

  use super::*;

  #[test]
  fn starts_empty() {
    let slot: Published<u32> = Published::empty();
    assert!(slot.load().is_none());
    assert_eq!(slot.retired(), 0);
  }

  #[test]
  fn publish_replaces_and_clears() {
    let slot = Published::empty();
    slot.publish(Some(String::from("a")));
    assert_eq!(slot.load().map(String::as_str), Some("a"));

    slot.publish(Some(String::from("b")));
    assert_eq!(slot.load().map(String::as_str), Some("b"));

    slot.publish(None);
    assert!(slot.load().is_none());
  }

  #[test]
  fn failed_update_keeps_value() {
    let slot = Published::empty();
    slot.publish(Some(7u32));
    let result: Result<(), &str> = slot.update(|_| Err("nope"));
    assert!(result.is_err());
    assert_eq!(slot.load(), Some(&7));
  }

  #[test]
  fn old_reference_survives_replacement() {
    let slot = Published::empty();
    slot.publish(Some(vec![1u8, 2, 3]));
    let old = slot.load().unwrap();
    slot.publish(Some(vec![9u8]));
    assert_eq!(old, &vec![1, 2, 3]);
    assert_eq!(slot.load(), Some(&vec![9]));
  }

  #[test]
  fn keep_retires_nothing() {
    let slot = Published::empty();
    slot.publish(Some(String::from("a")));
    let before: *const String = slot.load().unwrap();

    for _ in 0..16 {
      let kept: Result<(), ()> = slot.update(|_| Ok(Next::Keep));
      assert!(kept.is_ok());
    }

    assert!(ptr::eq(before, slot.load().unwrap()));
    assert_eq!(slot.retired(), 0);
  }

  #[test]
  fn clearing_an_empty_slot_retires_nothing() {
    let slot: Published<u32> = Published::empty();
    slot.publish(None);
    assert_eq!(slot.retired(), 0);

    slot.publish(Some(1));
    slot.publish(None);
    assert_eq!(slot.retired(), 1);
  }

  struct Counted(Arc<AtomicUsize>);

  impl Drop for Counted {
    fn drop(&mut self) {
      self.0.fetch_add(1, Ordering::SeqCst);
    }
  }

  #[test]
  fn drop_releases_every_snapshot() {
    let drops = Arc::new(AtomicUsize::new(0));
    {
      let slot = Published::empty();
      slot.publish(Some(Counted(drops.clone())));
      slot.publish(Some(Counted(drops.clone())));
      slot.publish(Some(Counted(drops.clone())));
      assert_eq!(drops.load(Ordering::SeqCst), 0);
    }
    assert_eq!(drops.load(Ordering::SeqCst), 3);
  }

  #[test]
  fn concurrent_writers_converge() {
    let slot = Arc::new(Published::empty());
    let handles: Vec<_> = (0..8)
      .map(|i| {
        let slot = slot.clone();
        thread::spawn(move || {
          for _ in 0..100 {
            slot.publish(Some(i));
          }
        })
      })
      .collect();
    for handle in handles {
      handle.join().unwrap();
    }
    let last = *slot.load().unwrap();
    assert!((0..8).contains(&last));
  }
}
