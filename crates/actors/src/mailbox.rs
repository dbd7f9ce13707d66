use tokio::sync::mpsc;

use crate::{actor::ActorError, handler::MessageHandler, Actor};

pub type Envelope<A> = Box<dyn MessageHandler<A>>;

pub struct Mailbox<A: Actor>(mpsc::Sender<Envelope<A>>);

impl<A: Actor> Clone for Mailbox<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A: Actor> Mailbox<A> {
    pub async fn send<M>(&self, message: M) -> Result<(), ActorError>
    where
        M: MessageHandler<A> + 'static,
    {
        self.0
            .send(Box::new(message))
            .await
            .map_err(|_| ActorError::Closed)
    }

    pub fn downgrade(&self) -> WeakMailbox<A> {
        WeakMailbox(self.0.downgrade())
    }
}

/// A mailbox handle that does not keep the actor alive.
pub struct WeakMailbox<A: Actor>(mpsc::WeakSender<Envelope<A>>);

impl<A: Actor> Clone for WeakMailbox<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A: Actor> WeakMailbox<A> {
    pub fn upgrade(&self) -> Option<Mailbox<A>> {
        self.0.upgrade().map(Mailbox)
    }
}

pub struct MailboxReceiver<A: Actor>(mpsc::Receiver<Envelope<A>>);

impl<A: Actor> MailboxReceiver<A> {
    pub async fn recv(&mut self) -> Option<Envelope<A>> {
        self.0.recv().await
    }
}

pub fn bounded_mailbox<A: Actor>(buffer: usize) -> (Mailbox<A>, MailboxReceiver<A>) {
    let (tx, rx) = mpsc::channel(buffer);
    (Mailbox(tx), MailboxReceiver(rx))
}
