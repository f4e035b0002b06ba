use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use tandem_concurrency::{Runner, RunnerConfig, RunnerError, WaitStrategy};

/// Writer that sleeps on every write to widen any race window
#[derive(Debug)]
struct SlowWriter {
    buf: Vec<u8>,
    delay: Duration,
}

impl Write for SlowWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        thread::sleep(self.delay);
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn parse(line: &str) -> (&str, u32) {
    let (label, value) = line.split_once(": ").expect("line has a label");
    (label, value.parse().expect("line ends in a number"))
}

fn check_output(output: &str, start: u32, end: u32) {
    let lines: Vec<(&str, u32)> = output.lines().map(parse).collect();
    let per_task = (end - start + 1) as usize;
    assert_eq!(lines.len(), per_task * 2);

    let (up, down) = lines.split_at(per_task);

    assert!(up.iter().all(|(label, _)| *label == "Counting Up"));
    assert!(down.iter().all(|(label, _)| *label == "Counting Down"));

    let up_values: Vec<u32> = up.iter().map(|(_, v)| *v).collect();
    let down_values: Vec<u32> = down.iter().map(|(_, v)| *v).collect();
    assert_eq!(up_values, (start..=end).collect::<Vec<_>>());
    assert_eq!(down_values, (start..=end).rev().collect::<Vec<_>>());
}

#[test]
fn test_repeated_runs_keep_order() {
    for wait in [WaitStrategy::Spin, WaitStrategy::Block] {
        let runner = Runner::new(RunnerConfig::default().with_wait(wait)).unwrap();

        for _ in 0..50 {
            let report = runner.run(Vec::<u8>::new()).unwrap();
            check_output(&String::from_utf8(report.writer).unwrap(), 0, 20);
        }
    }
}

#[test]
fn test_slow_writer_keeps_down_counter_waiting() {
    for wait in [WaitStrategy::Spin, WaitStrategy::Block] {
        let runner = Runner::new(RunnerConfig::default().with_wait(wait)).unwrap();
        let writer = SlowWriter {
            buf: Vec::new(),
            delay: Duration::from_micros(200),
        };

        let report = runner.run(writer).unwrap();

        assert_eq!(report.up_emitted, 21);
        assert_eq!(report.down_emitted, 21);
        check_output(&String::from_utf8(report.writer.buf).unwrap(), 0, 20);
    }
}

#[test]
fn test_wait_timeout_reports_error() {
    let config = RunnerConfig {
        wait_timeout_ms: Some(1),
        ..RunnerConfig::default()
    };
    let writer = SlowWriter {
        buf: Vec::new(),
        delay: Duration::from_millis(5),
    };

    // The up-counter needs far longer than 1ms, so the down-counter gives up
    let err = Runner::new(config).unwrap().run(writer).unwrap_err();
    assert!(matches!(err, RunnerError::SignalTimeout(_)));
}

#[test]
fn test_toml_config_drives_run() {
    let config = RunnerConfig::from_toml_str("start = 10\nend = 12\nwait = \"spin\"\n").unwrap();
    let report = Runner::new(config).unwrap().run(Vec::<u8>::new()).unwrap();

    assert_eq!(
        String::from_utf8(report.writer).unwrap(),
        "Counting Up: 10\nCounting Up: 11\nCounting Up: 12\n\
         Counting Down: 12\nCounting Down: 11\nCounting Down: 10\n"
    );
}
