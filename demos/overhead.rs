//! Dispatch overhead measurement
//!
//! This example times a call point in four states: the raw closure, the
//! point with no hooks bound, with a disabled hook in the chain, and
//! with an enabled pass-through hook.

use std::time::Instant;

use waylay::{HookResult, Intercept, ObjectHooks, json};

const ROUNDS: u32 = 200_000;

struct Adder {
    hooks: ObjectHooks,
}

impl Intercept for Adder {}

impl Adder {
    fn add(&self, a: i64, b: i64) -> HookResult<i64> {
        let value = self
            .hooks
            .wrap_call("add", self, vec![json!(a), json!(b)], |args| {
                Ok(json!(
                    args[0].as_i64().unwrap_or(0) + args[1].as_i64().unwrap_or(0)
                ))
            })?;
        Ok(value.as_i64().unwrap_or(0))
    }
}

fn time(label: &str, mut body: impl FnMut() -> HookResult<i64>) -> HookResult<()> {
    let start = Instant::now();
    let mut sum: i64 = 0;
    for _ in 0..ROUNDS {
        sum += body()?;
    }
    let elapsed = start.elapsed();
    println!(
        "   {label:<16} {elapsed:>12.2?}  ({:.0} ns/call, checksum {sum})",
        elapsed.as_nanos() as f64 / ROUNDS as f64
    );
    Ok(())
}

fn main() -> HookResult<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    println!("⏱️ Waylay Overhead Demo");
    println!("========================\n");
    println!("📊 {ROUNDS} calls per measurement\n");

    let adder = Adder {
        hooks: ObjectHooks::of::<Adder>(),
    };

    println!("🏁 1. Baseline closure (no dispatch)");
    time("raw closure", || Ok(2 + 3))?;

    println!("\n🟢 2. Point with no hooks bound");
    time("unhooked point", || adder.add(2, 3))?;

    println!("\n🟡 3. Disabled hook in the chain");
    let hook = adder.hooks.bind("add", |invocation| invocation.proceed());
    hook.disable();
    time("disabled hook", || adder.add(2, 3))?;

    println!("\n🔴 4. Enabled pass-through hook");
    hook.enable();
    time("enabled hook", || adder.add(2, 3))?;

    hook.unbind();
    println!("\n🎉 Overhead demo completed successfully!");
    Ok(())
}
