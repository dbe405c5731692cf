//! Search-as-you-type on a state field.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Watch one field of a screen state and run `lookup` once typing pauses.
///
/// The field's current value is captured when this is called; only later
/// changes can trigger a lookup. A change to the projected field starts or
/// restarts a `window`-long quiet period; changes to other fields are
/// ignored. When the period elapses, a value equal to the last one looked
/// at is dropped, as is a blank one. Anything else is passed to `lookup`
/// trimmed. The returned future completes when the state sender goes away.
pub(crate) fn debounce_field<S, P, L, Fut>(
    mut states: watch::Receiver<S>,
    window: Duration,
    project: P,
    mut lookup: L,
) -> impl Future<Output = ()>
where
    P: Fn(&S) -> String,
    L: FnMut(String) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut last = project(&states.borrow_and_update());

    async move {
        loop {
            let mut pending = loop {
                if states.changed().await.is_err() {
                    return;
                }
                let value = project(&states.borrow_and_update());
                if value != last {
                    break value;
                }
            };

            let quiet = tokio::time::sleep(window);
            tokio::pin!(quiet);
            loop {
                tokio::select! {
                    changed = states.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        let value = project(&states.borrow_and_update());
                        if value != pending {
                            pending = value;
                            quiet.as_mut().reset(Instant::now() + window);
                        }
                    }
                    () = &mut quiet => break,
                }
            }

            if pending == last {
                continue;
            }
            last.clone_from(&pending);

            let query = pending.trim();
            if query.is_empty() {
                continue;
            }
            lookup(query.to_string()).await;
        }
    }
}
