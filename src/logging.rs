#![allow(unused_macros)]

// Both macros expand to nothing unless the `logging` feature is on, so
// arguments are only evaluated when a logger can see them.

macro_rules! debug {
    ($($arg:tt)+) => (
        #[cfg(feature = "logging")]
        log::debug!(target: "memseq", $($arg)+);
    )
}

macro_rules! trace {
    ($($arg:tt)+) => (
        #[cfg(feature = "logging")]
        log::trace!(target: "memseq", $($arg)+);
    )
}

#[cfg(all(test, feature = "logging"))]
mod logging_tests {
    use crate::Sequence;
    use log::{Level, Log, Metadata, Record};
    use std::cell::RefCell;
    use std::sync::Once;

    thread_local! {
        static LINES: RefCell<Vec<String>> = RefCell::new(Vec::new());
    }

    /// Keeps `memseq` debug lines of the current thread.
    struct Capture;

    impl Log for Capture {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.target() == "memseq" && metadata.level() <= Level::Debug
        }

        fn log(&self, record: &Record) {
            if self.enabled(record.metadata()) {
                LINES.with(|l| l.borrow_mut().push(record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static CAPTURE: Capture = Capture;
    static INSTALL: Once = Once::new();

    fn captured<F: FnOnce()>(f: F) -> Vec<String> {
        INSTALL.call_once(|| {
            log::set_logger(&CAPTURE).ok();
            log::set_max_level(log::LevelFilter::Trace);
        });
        LINES.with(|l| l.borrow_mut().clear());
        f();
        LINES.with(|l| l.borrow_mut().split_off(0))
    }

    #[test]
    fn reallocation_names_its_cause() {
        let lines = captured(|| {
            let mut seq = Sequence::<u32>::new();
            seq.reserve(3);
            seq.push_back(1);
            seq.push_back(2);
            seq.push_back(3);
            seq.insert(0, 0);
        });
        assert!(lines.contains(&"reserve: reallocated 0 -> 3 slots".to_string()), "{:?}", lines);
        assert!(lines.contains(&"insert: reallocated 3 -> 6 slots".to_string()), "{:?}", lines);
    }
}
