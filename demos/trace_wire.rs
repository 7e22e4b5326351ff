//! Wire tracing demonstration
//!
//! This example registers a fake transport's send routine as a named
//! target, then attaches the bundled tracer to watch frames without
//! touching the transport code.

use waylay::{ClassHooks, HookResult, Intercept, Tracer, json};

struct Transport;

impl Intercept for Transport {}

fn main() -> HookResult<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    println!("📡 Waylay Wire Trace Demo");
    println!("=========================\n");

    // 1. Register the transport's original behavior as named targets
    println!("📋 1. Registering the `send` and `recv` targets");
    let transport = ClassHooks::of::<Transport>();
    transport.provide("send", |_receiver, args| {
        let frame = args[0].as_str().unwrap_or_default();
        Ok(json!(format!("ack:{frame}")))
    });
    transport.provide("recv", |_receiver, _args| Ok(json!("DATA 7")));
    println!("✅ Targets registered");

    // 2. Attach a tracer per point; hack fails loudly if a target is missing
    println!("\n🔎 2. Attaching tracers");
    let sent = transport.hack("send", Tracer::with_tag("wire-out").into_proc())?;
    let received = transport.hack("recv", Tracer::with_tag("wire-in").into_proc())?;
    println!("✅ Tracers attached (lines go to stderr)");

    // 3. Drive some traffic through the observed paths
    println!("\n🚚 3. Sending and receiving frames");
    for frame in ["SYN", "DATA 42", "FIN"] {
        let reply = transport.call_method("send", vec![json!(frame)])?;
        println!("   reply: {reply}");
    }
    let frame = transport.call_method("recv", vec![])?;
    println!("   received: {frame}");

    // 4. Detach and send once more, now unobserved
    println!("\n🧹 4. Detaching");
    sent.unbind();
    received.unbind();
    let reply = transport.call_method("send", vec![json!("SYN")])?;
    println!("   reply: {reply}");

    println!("\n🎉 Wire trace demo completed successfully!");
    Ok(())
}
