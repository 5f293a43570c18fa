use std::fmt::Display;
use std::future::Future;
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};

/// Run one named operation inside a `step` span and log how it ended.
///
/// Applied explicitly where a step should show up in the test log; nothing
/// is wrapped implicitly.
pub async fn step<T, E, Fut>(name: &str, operation: Fut) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let span = info_span!("step", name);
    let started = Instant::now();
    let result = operation.instrument(span.clone()).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    span.in_scope(|| match &result {
        Ok(_) => info!(elapsed_ms, "{} passed", name),
        Err(e) => error!(elapsed_ms, "{} failed: {}", name, e),
    });
    result
}
