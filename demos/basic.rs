//! Basic hook walkthrough
//!
//! This example shows the core workflow: declare a call point inside a
//! method, bind hooks that observe and rewrite the call, switch them
//! off and on, and unbind.

use waylay::{HookResult, Intercept, ObjectHooks, json};

struct Greeter {
    hooks: ObjectHooks,
}

impl Intercept for Greeter {}

impl Greeter {
    fn new() -> Self {
        Self {
            hooks: ObjectHooks::of::<Greeter>(),
        }
    }

    fn greet(&self, name: &str) -> HookResult<String> {
        let value = self
            .hooks
            .wrap_call("greet", self, vec![json!(name)], |args| {
                Ok(json!(format!("Hello, {}.", args[0].as_str().unwrap_or("?"))))
            })?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }
}

fn main() -> HookResult<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    println!("👋 Waylay Basic Demo");
    println!("====================\n");

    let greeter = Greeter::new();

    // 1. An unhooked point runs the original directly
    println!("📋 1. Plain call");
    println!("   {}", greeter.greet("Leeroy")?);

    // 2. Rewrite the arguments on the way in
    println!("\n✏️ 2. Argument rewrite");
    let rename = greeter.hooks.bind("greet", |invocation| {
        invocation.args[0] = json!("Jenkins");
        invocation.proceed()
    });
    println!("   {}", greeter.greet("Leeroy")?);

    // 3. Wrap the result on the way out
    println!("\n🎀 3. Result wrap");
    let shout = greeter.hooks.bind("greet", |invocation| {
        let value = invocation.proceed()?;
        Ok(json!(value.as_str().unwrap_or_default().to_uppercase()))
    });
    println!("   {}", greeter.greet("Leeroy")?);

    // 4. Veto: answer without ever reaching the original
    println!("\n🛑 4. Veto");
    let veto = greeter.hooks.bind("greet", |_invocation| Ok(json!("No greetings today.")));
    println!("   {}", greeter.greet("Leeroy")?);
    veto.unbind();

    // 5. Switch a hook off without unbinding it
    println!("\n🔌 5. Disable / enable");
    shout.disable();
    println!("   disabled: {}", greeter.greet("Leeroy")?);
    shout.enable();
    println!("   enabled:  {}", greeter.greet("Leeroy")?);

    // 6. Unbind restores the original for good
    println!("\n🧹 6. Unbind");
    shout.unbind();
    rename.unbind();
    println!("   {}", greeter.greet("Leeroy")?);

    println!("\n🎉 Basic demo completed successfully!");
    Ok(())
}
