use tokio::sync::oneshot;

use crate::{
    actor::{Actor, ActorError},
    handler::{ActorMessage, Handler, Message},
    mailbox::{Mailbox, WeakMailbox},
};

pub struct ActorRef<A: Actor> {
    sender: Mailbox<A>,
}

impl<A: Actor> Clone for ActorRef<A> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<A: Actor> ActorRef<A> {
    pub(crate) fn new(sender: Mailbox<A>) -> Self {
        Self { sender }
    }

    /// Sends a message without waiting for it to be handled.
    pub async fn tell<M>(&self, msg: M) -> Result<(), ActorError>
    where
        M: Message,
        A: Handler<M>,
    {
        let message = ActorMessage::<M, A>::new(msg, None);
        self.sender.send(message).await
    }

    /// Sends a message and waits for the handler's answer.
    pub async fn ask<M>(&self, msg: M) -> Result<M::Response, ActorError>
    where
        M: Message,
        A: Handler<M>,
    {
        let (response_tx, response_rx) = oneshot::channel();
        let message = ActorMessage::<M, A>::new(msg, Some(response_tx));
        self.sender.send(message).await?;
        Ok(response_rx.await?)
    }

    pub fn downgrade(&self) -> WeakActorRef<A> {
        WeakActorRef {
            sender: self.sender.downgrade(),
        }
    }
}

/// Reference that does not keep the actor running. Once every `ActorRef` is
/// dropped the event loop ends and `upgrade` returns `None`.
pub struct WeakActorRef<A: Actor> {
    sender: WeakMailbox<A>,
}

impl<A: Actor> Clone for WeakActorRef<A> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<A: Actor> WeakActorRef<A> {
    pub fn upgrade(&self) -> Option<ActorRef<A>> {
        self.sender.upgrade().map(ActorRef::new)
    }
}

/// Handed to every handler invocation.
pub struct Context<A: Actor> {
    myself: WeakActorRef<A>,
}

impl<A: Actor> Context<A> {
    pub(crate) fn new(myself: WeakActorRef<A>) -> Self {
        Self { myself }
    }

    pub fn weak(&self) -> WeakActorRef<A> {
        self.myself.clone()
    }

    /// Delivers `message` to this actor from a spawned task once `future`
    /// completes. Nothing is delivered if the actor stopped in the meantime.
    pub fn notify_when<F, M>(&self, future: F) -> tokio::task::JoinHandle<()>
    where
        F: std::future::Future<Output = M> + Send + 'static,
        M: Message,
        A: Handler<M>,
    {
        let myself = self.weak();
        tokio::spawn(async move {
            let message = future.await;
            let Some(actor) = myself.upgrade() else {
                log::debug!("actor stopped before the result arrived");
                return;
            };
            if let Err(why) = actor.tell(message).await {
                log::debug!("could not deliver result: {}", why);
            }
        })
    }
}
