/// Execute an aggregate command deterministically (no IO, no async).
///
/// 1. **Decide**: `aggregate.handle(command)` produces events without mutating.
/// 2. **Evolve**: each event is applied in order via `aggregate.apply(event)`.
///
/// If `handle` fails, the aggregate is untouched. The returned events are the
/// ones that were applied, ready to be published.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: storefront_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}
