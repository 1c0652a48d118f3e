use std::io::{self, Write};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};

use scopelog::{Adapter, Context, Field, Level, Logger, Valuer, builder, from_context, immut_string};

/// A writer whose clones share one buffer, so tests can hand a copy to the
/// logger and keep another to inspect.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    fn records(&self) -> Vec<serde_json::Value> {
        self.contents()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn captured_logger(level: &str) -> (Logger, SharedBuf) {
    let buf = SharedBuf::default();
    let log = builder()
        .with_adapter(Adapter::Custom)
        .with_writer(buf.clone())
        .with_level(level)
        .build();
    (log, buf)
}

#[test]
fn test_below_threshold_emits_nothing() {
    let (log, buf) = captured_logger("warn");

    log.debug("quiet");
    log.info("quiet");
    log.debugf(format_args!("quiet {}", 1));
    log.infow("quiet", [Field::int("n", 1)]);

    assert!(buf.contents().is_empty());
}

#[test]
fn test_at_threshold_emits_one_record_per_call() {
    let (log, buf) = captured_logger("warn");

    log.warn("first");
    log.error("second");

    let records = buf.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["level"], "warn");
    assert_eq!(records[0]["msg"], "first");
    assert_eq!(records[1]["level"], "error");
    assert_eq!(records[1]["msg"], "second");
}

#[test]
fn test_print_style_single_string_is_verbatim() {
    let (log, buf) = captured_logger("info");

    log.info("plain text, no quoting");

    assert_eq!(buf.records()[0]["msg"], "plain text, no quoting");
}

#[test]
fn test_print_style_tuple_concatenates() {
    let (log, buf) = captured_logger("debug");

    log.debug(("Debug", "-", "111111", "-", 1));

    assert_eq!(buf.records()[0]["msg"], "Debug-111111-1");
}

#[test]
fn test_format_style_renders_template() {
    let (log, buf) = captured_logger("debug");

    log.debugf(format_args!("Debugf: {}", "debug"));

    assert_eq!(buf.records()[0]["msg"], "Debugf: debug");
}

#[test]
fn test_keyed_style_separates_message_and_fields() {
    let (log, buf) = captured_logger("info");

    log.infow(
        "Infow",
        [Field::string("Infow", "w"), Field::int("status", 200)],
    );

    let record = &buf.records()[0];
    assert_eq!(record["msg"], "Infow");
    assert_eq!(record["Infow"], "w");
    assert_eq!(record["status"], 200);
}

#[test]
fn test_valuer_fields_follow_msg_in_registration_order() {
    let (log, buf) = captured_logger("info");
    let log = log.with_valuer([
        immut_string("first", "1"),
        immut_string("second", "2"),
    ]);

    log.infow("hello", [Field::string("tail", "t")]);

    let line = buf.contents();
    let msg = line.find("\"msg\"").unwrap();
    let first = line.find("\"first\"").unwrap();
    let second = line.find("\"second\"").unwrap();
    let tail = line.find("\"tail\"").unwrap();
    assert!(msg < first && first < second && second < tail);
}

#[test]
fn test_valuers_read_the_attached_context() {
    let (log, buf) = captured_logger("info");
    let ctx = Context::new().with_value("req_id", "r-42");
    let log = log.with_context(ctx).with_valuer([from_context("req_id")]);

    log.info("handled");

    assert_eq!(buf.records()[0]["req_id"], "r-42");
}

#[test]
fn test_with_new_valuer_drops_inherited_valuers() {
    let (log, buf) = captured_logger("info");
    let log = log.with_valuer([immut_string("inherited", "x")]);
    let replaced = log.with_new_valuer([immut_string("fresh", "y")]);

    replaced.info("hello");

    let record = &buf.records()[0];
    assert!(record.get("inherited").is_none());
    assert_eq!(record["fresh"], "y");
}

#[test]
fn test_set_default_valuer_mutates_in_place() {
    let (mut log, buf) = captured_logger("info");
    log.set_default_valuer([immut_string("svc", "billing")]);

    log.info("hello");

    assert_eq!(buf.records()[0]["svc"], "billing");
}

#[test]
fn test_derivation_isolates_siblings() {
    let (parent, buf) = captured_logger("info");
    let left = parent.with([Field::string("side", "left")]);
    let right = parent.with([Field::string("side", "right")]);

    parent.info("from parent");
    left.info("from left");
    right.info("from right");

    let records = buf.records();
    assert!(records[0].get("side").is_none());
    assert_eq!(records[1]["side"], "left");
    assert_eq!(records[2]["side"], "right");
}

#[test]
fn test_named_children_join_with_dots() {
    let (log, buf) = captured_logger("info");

    log.named("api").named("auth").info("hello");
    log.info("unnamed");

    let records = buf.records();
    assert_eq!(records[0]["project"], "api.auth");
    assert!(records[1].get("project").is_none());
}

#[test]
fn test_level_cell_is_shared_across_derivations() {
    let (parent, buf) = captured_logger("info");
    let child = parent.with([Field::string("k", "v")]);

    assert!(!child.enabled(Level::Debug));
    parent.set_level(Level::Debug);
    assert!(child.enabled(Level::Debug));

    child.set_level(Level::Error);
    assert!(!parent.enabled(Level::Warn));

    parent.debug("suppressed");
    assert!(buf.contents().is_empty());
}

#[test]
fn test_set_level_with_text_rejects_unknown_text() {
    let (log, buf) = captured_logger("warn");

    assert!(log.set_level_with_text("not-a-level").is_err());
    assert_eq!(log.level(), Level::Warn);

    log.warn("still emits");
    assert_eq!(buf.records().len(), 1);

    log.set_level_with_text("debug").unwrap();
    assert_eq!(log.level(), Level::Debug);
}

#[test]
fn test_panic_carries_the_rendered_message() {
    let (log, buf) = captured_logger("debug");

    let err = catch_unwind(AssertUnwindSafe(|| log.panic(("boom", "-", 7)))).unwrap_err();
    let payload = err.downcast_ref::<String>().unwrap();

    assert_eq!(payload, "boom-7");
    assert_eq!(buf.records()[0]["msg"], "boom-7");
    assert_eq!(buf.records()[0]["level"], "panic");
}

#[test]
fn test_disabled_panic_level_neither_panics_nor_logs() {
    let (log, buf) = captured_logger("fatal");

    let outcome = catch_unwind(AssertUnwindSafe(|| log.panic("boom")));

    assert!(outcome.is_ok());
    assert!(buf.contents().is_empty());
}

#[test]
fn test_dpanic_panics_only_in_development() {
    let buf = SharedBuf::default();
    let log = builder()
        .with_adapter(Adapter::Custom)
        .with_writer(buf.clone())
        .with_level("debug")
        .build();

    assert!(catch_unwind(AssertUnwindSafe(|| log.dpanic("tolerated"))).is_ok());
    assert_eq!(buf.records()[0]["level"], "dpanic");

    let dev_buf = SharedBuf::default();
    let dev_log = builder()
        .with_adapter(Adapter::Custom)
        .with_writer(dev_buf.clone())
        .with_level("debug")
        .with_development(true)
        .build();

    assert!(catch_unwind(AssertUnwindSafe(|| dev_log.dpanic("strict"))).is_err());
    assert_eq!(dev_buf.records()[0]["msg"], "strict");
}

#[test]
fn test_custom_adapter_fans_out_to_every_writer() {
    let a = SharedBuf::default();
    let b = SharedBuf::default();
    let log = builder()
        .with_adapter(Adapter::Custom)
        .with_writer(a.clone())
        .with_writer(b.clone())
        .with_level("info")
        .build();

    log.info("everywhere");

    assert_eq!(a.records()[0]["msg"], "everywhere");
    assert_eq!(b.records()[0]["msg"], "everywhere");
}

#[test]
fn test_console_format_emits_tab_separated_lines() {
    let buf = SharedBuf::default();
    let log = builder()
        .with_adapter(Adapter::Custom)
        .with_writer(buf.clone())
        .with_format("console")
        .with_level("info")
        .build()
        .named("api");

    log.info("hello");

    let line = buf.contents();
    assert!(line.contains("\tinfo\tapi\t"));
    assert!(line.contains("{\"msg\":\"hello\"}"));
}

#[test]
fn test_caller_reports_this_file_shortened() {
    let buf = SharedBuf::default();
    let log = builder()
        .with_adapter(Adapter::Custom)
        .with_writer(buf.clone())
        .with_add_caller(true)
        .with_level("info")
        .build();

    log.info("who called");
    let expected = format!("tests/facade_tests.rs:{}", line!() - 1);

    assert_eq!(buf.records()[0]["caller"], expected.as_str());
}

#[test]
fn test_caller_skip_reports_the_wrapper_caller() {
    let buf = SharedBuf::default();
    let log = builder()
        .with_adapter(Adapter::Custom)
        .with_writer(buf.clone())
        .with_add_caller(true)
        .with_caller_skip(1)
        .with_level("info")
        .build();

    #[inline(never)]
    fn wrapped_log(log: &Logger) {
        log.info("through a wrapper");
    }

    wrapped_log(&log);
    let expected = format!("tests/facade_tests.rs:{}", line!() - 1);

    assert_eq!(buf.records()[0]["caller"], expected.as_str());
}

#[test]
fn test_stacktrace_only_on_dpanic_and_above() {
    let buf = SharedBuf::default();
    let log = builder()
        .with_adapter(Adapter::Custom)
        .with_writer(buf.clone())
        .with_stack(true)
        .with_level("debug")
        .build();

    log.error("no stack");
    let record = &buf.records()[0];
    assert!(record.get("stacktrace").is_none());

    log.dpanic("with stack");
    let record = &buf.records()[1];
    assert!(record.get("stacktrace").is_some());
}

#[test]
fn test_concurrent_logging_yields_one_record_per_call() {
    let (log, buf) = captured_logger("info");
    let threads = 8;
    let per_thread = 50;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let log = log.clone();
            std::thread::spawn(move || {
                for i in 0..per_thread {
                    log.infow("tick", [Field::int("t", t), Field::int("i", i)]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let records = buf.records();
    assert_eq!(records.len(), (threads * per_thread) as usize);
    assert!(records.iter().all(|r| r["msg"] == "tick"));
}

#[test]
fn test_derivation_concurrent_with_logging() {
    let (log, buf) = captured_logger("info");

    let logger = log.clone();
    let writer = std::thread::spawn(move || {
        for _ in 0..100 {
            logger.info("steady");
        }
    });
    let deriver = std::thread::spawn(move || {
        for i in 0..100 {
            let child = log.with([Field::int("i", i)]);
            child.info("derived");
        }
    });
    writer.join().unwrap();
    deriver.join().unwrap();

    assert_eq!(buf.records().len(), 200);
}

#[test]
fn test_valuers_are_reevaluated_each_call() {
    let (log, buf) = captured_logger("info");
    let counter = Arc::new(Mutex::new(0i64));
    let seen = counter.clone();
    let log = log.with_valuer([Valuer::new(move |_| {
        let mut n = seen.lock().unwrap();
        *n += 1;
        Field::int("call", *n)
    })]);

    log.info("one");
    log.info("two");

    let records = buf.records();
    assert_eq!(records[0]["call"], 1);
    assert_eq!(records[1]["call"], 2);
}
