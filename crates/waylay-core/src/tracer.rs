//! Ready-made hook that logs entry, exit, and errors around a point

use std::sync::Arc;

use serde_json::Value;

use crate::error::HookResult;
use crate::invocation::Invocation;

/// Builds a hook procedure that reports every pass through a point:
/// one line on entry with the arguments, one on exit with the returned
/// value or the error. The call itself is untouched, errors included.
///
/// ```
/// use waylay_core::{ClassHooks, Intercept, Tracer};
///
/// struct Mailer;
/// impl Intercept for Mailer {}
///
/// let class = ClassHooks::of::<Mailer>();
/// let hook = class.bind("deliver", Tracer::with_tag("mail").into_proc());
/// # hook.unbind();
/// ```
pub struct Tracer {
    tag: String,
    printer: Arc<dyn Fn(&str) + Send + Sync>,
}

impl Tracer {
    /// Tracer writing to stderr under the default `trace` tag
    pub fn new() -> Self {
        Self::with_tag("trace")
    }

    /// Tracer writing to stderr under `tag`
    pub fn with_tag(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            printer: Arc::new(|line| eprintln!("{line}")),
        }
    }

    /// Replace the output sink. Tests use this to capture lines.
    pub fn with_printer<F>(mut self, printer: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.printer = Arc::new(printer);
        self
    }

    /// Consume the tracer into a procedure accepted by `bind` and `hack`
    pub fn into_proc(self) -> impl Fn(&mut Invocation<'_>) -> HookResult<Value> + Send + Sync + 'static {
        let Self { tag, printer } = self;
        move |invocation| {
            let point = invocation.point().clone();
            printer(&format!(
                "[{tag}] >> {point} args={}",
                Value::Array(invocation.args.clone())
            ));
            match invocation.proceed() {
                Ok(value) => {
                    printer(&format!("[{tag}] << {point} returned={value}"));
                    Ok(value)
                }
                Err(error) => {
                    printer(&format!("[{tag}] !! {point} error={error}"));
                    Err(error)
                }
            }
        }
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}
