use std::panic::AssertUnwindSafe;

use actor::{Actor, SupervisionStrategy};
use actor_ref::{ActorRef, Context};
use futures::FutureExt;
use mailbox::bounded_mailbox;

pub mod actor;
pub mod actor_ref;
pub mod handler;
pub mod mailbox;
pub mod schedule;

const MAILBOX_SIZE: usize = 32;

/// Creates and runs an actor. If the actor panics, it is either restared, resumed
/// or stoped acording to the behavior specified by `Actor::on_fail()`.
///
/// The event loop handles one message at a time and ends once every
/// `ActorRef` has been dropped.
pub fn run<A, F>(actor_factory: F) -> ActorRef<A>
where
    A: Actor,
    F: 'static + Send + Fn() -> A,
{
    let (tx, mut rx) = bounded_mailbox(MAILBOX_SIZE);
    let mut actor = actor_factory();
    let actor_ref = ActorRef::new(tx);
    let ctx = Context::new(actor_ref.downgrade());

    // run actor
    tokio::spawn(async move {
        while let Some(mut message) = rx.recv().await {
            // handle message
            let result = AssertUnwindSafe(message.handle(&mut actor, &ctx))
                .catch_unwind()
                .await;
            // handler paniced?
            if let Err(why) = result {
                log::error!("actor paniced: {:?}", why);
                match actor.on_fail(why) {
                    SupervisionStrategy::Restart => {
                        actor = actor_factory();
                    }
                    SupervisionStrategy::Resume => {}
                    SupervisionStrategy::Stop => {
                        break;
                    }
                };
            }
        }
        log::debug!("actor stopped");
    });

    actor_ref
}

/// Runs an already constructed actor. A panic can not restart it, so
/// `SupervisionStrategy::Restart` behaves like `Resume`.
pub fn spawn<A: Actor>(mut actor: A) -> ActorRef<A> {
    let (tx, mut rx) = bounded_mailbox(MAILBOX_SIZE);
    let actor_ref = ActorRef::new(tx);
    let ctx = Context::new(actor_ref.downgrade());

    tokio::spawn(async move {
        while let Some(mut message) = rx.recv().await {
            let result = AssertUnwindSafe(message.handle(&mut actor, &ctx))
                .catch_unwind()
                .await;
            if let Err(why) = result {
                log::error!("actor paniced: {:?}", why);
                if actor.on_fail(why) == SupervisionStrategy::Stop {
                    break;
                }
            }
        }
        log::debug!("actor stopped");
    });

    actor_ref
}
