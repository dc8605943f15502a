//! Concurrent fan-out over a list of inputs.

use std::future::Future;

use futures_util::future::try_join_all;

/// Run `f` over every input concurrently and collect the results in input order.
///
/// The first failure fails the whole fan-out; the remaining futures are
/// dropped. An empty input resolves immediately to an empty vector.
pub async fn try_fan_out<I, T, E, F, Fut>(inputs: I, f: F) -> Result<Vec<T>, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    try_join_all(inputs.into_iter().map(f)).await
}
