//! This module is for testing only

use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub type DropFlag<T> = Rc<RefCell<T>>;

#[derive(Default, Debug)]
pub struct Tally {
    pub made: usize,
    pub dropped: usize,
    /// Remaining successful clones; `None` means unlimited.
    pub clone_budget: Option<usize>,
}

/// Hands out `Counted` values and keeps track of how many of them are still alive.
#[derive(Clone)]
pub struct DropCounter {
    tally: DropFlag<Tally>,
}

impl DropCounter {
    pub fn new() -> DropCounter {
        DropCounter { tally: DropFlag::new(RefCell::new(Tally::default())) }
    }

    pub fn make(&self, value: i32) -> Counted {
        self.tally.borrow_mut().made += 1;
        Counted { value, tally: self.tally.clone() }
    }

    pub fn made(&self) -> usize {
        self.tally.borrow().made
    }

    pub fn dropped(&self) -> usize {
        self.tally.borrow().dropped
    }

    pub fn alive(&self) -> usize {
        let tally = self.tally.borrow();
        tally.made - tally.dropped
    }

    /// The clone after `n` more successful clones panics.
    pub fn fail_clones_after(&self, n: usize) {
        self.tally.borrow_mut().clone_budget = Some(n);
    }

    pub fn allow_clones(&self) {
        self.tally.borrow_mut().clone_budget = None;
    }
}

pub struct Counted {
    pub value: i32,
    tally: DropFlag<Tally>,
}

impl Clone for Counted {
    fn clone(&self) -> Self {
        let mut tally = self.tally.borrow_mut();
        if let Some(budget) = tally.clone_budget.as_mut() {
            if *budget == 0 {
                std::mem::drop(tally);
                panic!("clone of {} failed", self.value);
            }
            *budget -= 1;
        }
        tally.made += 1;
        Counted { value: self.value, tally: self.tally.clone() }
    }
}

impl Drop for Counted {
    fn drop(&mut self) {
        self.tally.borrow_mut().dropped += 1;
    }
}

impl PartialEq for Counted {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl std::fmt::Debug for Counted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Counted({})", self.value)
    }
}

thread_local! {
    static DEFAULT_BUDGET: Cell<Option<usize>> = Cell::new(None);
    static FRAGILE_ALIVE: Cell<usize> = Cell::new(0);
}

/// Default-constructible value whose constructor can be told to panic.
#[derive(Debug, PartialEq)]
pub struct Fragile(pub u32);

impl Fragile {
    pub fn new(value: u32) -> Fragile {
        FRAGILE_ALIVE.with(|a| a.set(a.get() + 1));
        Fragile(value)
    }

    /// The default construction after `n` more successful ones panics.
    pub fn fail_defaults_after(n: usize) {
        DEFAULT_BUDGET.with(|b| b.set(Some(n)));
    }

    pub fn allow_defaults() {
        DEFAULT_BUDGET.with(|b| b.set(None));
    }

    pub fn alive() -> usize {
        FRAGILE_ALIVE.with(|a| a.get())
    }
}

impl Default for Fragile {
    fn default() -> Self {
        DEFAULT_BUDGET.with(|b| match b.get() {
            Some(0) => panic!("default construction failed"),
            Some(n) => b.set(Some(n - 1)),
            None => (),
        });
        Fragile::new(7)
    }
}

impl Drop for Fragile {
    fn drop(&mut self) {
        FRAGILE_ALIVE.with(|a| a.set(a.get() - 1));
    }
}

#[test]
fn counter_tracks_drops() {
    let counter = DropCounter::new();
    let a = counter.make(1);
    let b = a.clone();
    assert_eq!(2, counter.alive());
    std::mem::drop(a);
    assert_eq!(1, counter.alive());
    std::mem::drop(b);
    assert_eq!(0, counter.alive());
    assert_eq!(2, counter.dropped());
}

#[test]
fn clone_budget_panics_when_exhausted() {
    let counter = DropCounter::new();
    let a = counter.make(5);
    counter.fail_clones_after(1);
    let _b = a.clone();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| a.clone()));
    assert!(result.is_err());
    assert_eq!(2, counter.alive());
}
