//! Tracer integration test
//!
//! This test drives the bundled tracer through real dispatch and checks
//! the capture pattern: a hook that records what a point produced
//! without disturbing the call.

use std::sync::{Arc, Mutex};

use waylay::{HookResult, Intercept, ObjectHooks, Tracer, Value, json};

fn capturing(tag: &str) -> (Tracer, Arc<Mutex<Vec<String>>>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();
    let tracer =
        Tracer::with_tag(tag).with_printer(move |line| sink.lock().unwrap().push(line.to_string()));
    (tracer, lines)
}

#[test]
fn test_tracer_records_entry_and_exit() {
    struct Wire;
    impl Intercept for Wire {}

    let hooks = ObjectHooks::of::<Wire>();
    let (tracer, lines) = capturing("wire");
    let hook = hooks.bind("transmit", tracer.into_proc());

    let value = hooks
        .wrap_call("transmit", &(), vec![json!("ping"), json!(2)], |args| {
            Ok(json!(format!("{}x{}", args[0].as_str().unwrap(), args[1])))
        })
        .unwrap();
    assert_eq!(value, json!("pingx2"));

    let lines = lines.lock().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], r#"[wire] >> transmit args=["ping",2]"#);
    assert_eq!(lines[1], r#"[wire] << transmit returned="pingx2""#);
    hook.unbind();
}

#[test]
fn test_tracer_reports_errors_and_propagates() {
    struct Wire;
    impl Intercept for Wire {}

    let hooks = ObjectHooks::of::<Wire>();
    let (tracer, lines) = capturing("wire");
    let hook = hooks.bind("drop", tracer.into_proc());

    let error = hooks
        .wrap_block("drop", || Err(anyhow::anyhow!("link down").into()))
        .unwrap_err();
    assert_eq!(error.to_string(), "link down");

    let lines = lines.lock().unwrap();
    assert_eq!(lines[0], "[wire] >> drop args=[]");
    assert_eq!(lines[1], "[wire] !! drop error=link down");
    hook.unbind();
}

#[test]
fn test_log_capture_without_disturbing_output() {
    struct Console {
        hooks: ObjectHooks,
    }
    impl Intercept for Console {}
    impl Console {
        fn log(&self, level: &str, message: &str) -> HookResult<Value> {
            self.hooks
                .wrap_call("log", self, vec![json!(level), json!(message)], |args| {
                    Ok(json!(format!(
                        "[{}] {}",
                        args[0].as_str().unwrap_or("?"),
                        args[1].as_str().unwrap_or("")
                    )))
                })
        }
    }

    let console = Console {
        hooks: ObjectHooks::of::<Console>(),
    };
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();
    let hook = console.hooks.bind("log", move |invocation| {
        let value = invocation.proceed()?;
        if let Some(line) = value.as_str() {
            sink.lock().unwrap().push(line.to_string());
        }
        Ok(value)
    });

    assert_eq!(console.log("info", "started").unwrap(), json!("[info] started"));
    assert_eq!(console.log("warn", "low disk").unwrap(), json!("[warn] low disk"));
    assert_eq!(
        *captured.lock().unwrap(),
        vec!["[info] started".to_string(), "[warn] low disk".to_string()]
    );

    // After unbind nothing is captured anymore
    hook.unbind();
    console.log("info", "untracked").unwrap();
    assert_eq!(captured.lock().unwrap().len(), 2);
}
