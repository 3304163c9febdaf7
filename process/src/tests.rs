//! Process scenario tests
//!
//! End-to-end behaviour of a freshly built process as filesystem code sees it.

#[cfg(test)]
mod cwd_tests {
    use crate::{ManualClock, Process};
    use alloc::sync::Arc;

    fn process() -> Process {
        Process::builder(Arc::new(ManualClock::new())).build()
    }

    #[test]
    fn test_tmp_then_var() {
        let p = process();
        assert_eq!(p.cwd(), "/");
        p.chdir("tmp").unwrap();
        assert_eq!(p.cwd(), "/tmp");
        p.chdir("../var").unwrap();
        assert_eq!(p.cwd(), "/var");
    }

    #[test]
    fn test_relative_from_nested() {
        let p = process();
        p.chdir("/a/b/c").unwrap();
        p.chdir("./../d/./e").unwrap();
        assert_eq!(p.cwd(), "/a/b/d/e");
    }

    #[test]
    fn test_cwd_never_empty() {
        let p = process();
        for target in ["", ".", "..", "/", "//", "../.."] {
            p.chdir(target).unwrap();
            assert_eq!(p.cwd(), "/");
        }
    }

    #[test]
    fn test_cwd_has_no_dot_segments() {
        let p = process();
        for target in ["x/./y", "../z/..", "/q/../r/./s", "t/"] {
            p.chdir(target).unwrap();
            let cwd = p.cwd();
            assert!(cwd.starts_with('/'));
            assert!(cwd.split('/').all(|seg| seg != "." && seg != ".."));
            assert!(cwd == "/" || !cwd.ends_with('/'));
        }
    }

    #[test]
    fn test_fresh_instances_are_isolated() {
        let a = process();
        let b = process();
        a.chdir("/only/a").unwrap();
        assert_eq!(b.cwd(), "/");
    }
}

#[cfg(test)]
mod stdio_tests {
    use crate::{EventKind, ManualClock, Process, StreamEvent};
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use spin::Mutex;

    #[test]
    fn test_streams_do_not_share_data() {
        let p = Process::builder(Arc::new(ManualClock::new())).build();
        p.stdout().write_str("out").unwrap();
        p.stderr().write_str("err!").unwrap();

        assert_eq!(p.stdout().buffered_len(), 3);
        assert_eq!(p.stderr().buffered_len(), 4);
        assert_eq!(p.stdin().buffered_len(), 0);
        assert_eq!(p.stderr().read(16).unwrap(), b"err!".to_vec());
        assert_eq!(p.stdout().buffered_len(), 3);
    }

    #[test]
    fn test_stdout_listener_sees_console_output() {
        let p = Process::builder(Arc::new(ManualClock::new())).build();
        let console = Arc::new(Mutex::new(Vec::new()));
        let sink = console.clone();
        p.stdout().on(EventKind::Data, move |event| {
            if let StreamEvent::Data(bytes) = event {
                sink.lock().extend_from_slice(bytes);
            }
        });
        p.stdout().write_str("line 1\n").unwrap();
        p.stderr().write_str("ignored\n").unwrap();
        p.stdout().write_str("line 2\n").unwrap();
        assert_eq!(*console.lock(), b"line 1\nline 2\n".to_vec());
    }

    #[test]
    fn test_ending_stdin_leaves_stdout_open() {
        let p = Process::builder(Arc::new(ManualClock::new())).build();
        p.stdin().end();
        assert!(p.stdin().is_ended());
        assert!(!p.stdout().is_ended());
        p.stdout().write(b"still open").unwrap();
    }
}

#[cfg(test)]
mod uptime_tests {
    use crate::{ManualClock, Process};
    use alloc::sync::Arc;

    #[test]
    fn test_uptime_counts_whole_seconds() {
        let clock = Arc::new(ManualClock::starting_at(1_700_000_000_000));
        let p = Process::builder(clock.clone()).build();
        assert_eq!(p.uptime(), 0);
        clock.advance(61_999);
        assert_eq!(p.uptime(), 61);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_system_clock_uptime_starts_at_zero() {
        let p = Process::new();
        assert_eq!(p.uptime(), 0);
        let first = p.uptime();
        assert!(p.uptime() >= first);
    }
}
