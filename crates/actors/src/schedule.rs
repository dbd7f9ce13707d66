use std::time::Duration;

use tokio::{task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use crate::{
    actor::Actor,
    actor_ref::WeakActorRef,
    handler::{Handler, Message},
};

/// Answer of a handler driven by [`repeat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Again,
    Stop,
}

/// Sends `message()` to the actor once per `period`, starting immediately,
/// until the handler answers [`Repeat::Stop`], the token is cancelled or the
/// actor goes away.
///
/// Each message is awaited before the next one is scheduled, so a slow handler
/// delays the chain instead of piling messages up in the mailbox.
pub fn repeat<A, M, F>(
    actor: WeakActorRef<A>,
    period: Duration,
    token: CancellationToken,
    message: F,
) -> JoinHandle<()>
where
    A: Actor + Handler<M>,
    M: Message<Response = Repeat>,
    F: Fn() -> M + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = interval.tick() => {}
            }
            let Some(actor) = actor.upgrade() else {
                break;
            };
            match actor.ask(message()).await {
                Ok(Repeat::Again) => {}
                Ok(Repeat::Stop) => break,
                Err(why) => {
                    log::debug!("repeating task ended: {}", why);
                    break;
                }
            }
        }
    })
}
