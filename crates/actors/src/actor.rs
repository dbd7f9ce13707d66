use core::fmt;
use std::any::Any;
use std::error::Error;

use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisionStrategy {
    Restart,
    Resume,
    Stop,
}

pub trait Actor: Sized + Send + Sync + 'static {
    /// Called when a handler on the actor panics. The return value represents the
    /// supervision strategy used to handle the panic.
    /// NOTE: If this method panics, the actor can not recover from the panic.
    #[allow(unused_variables)]
    fn on_fail(&mut self, error: Box<dyn Any + Send>) -> SupervisionStrategy {
        SupervisionStrategy::Restart
    }
}

#[derive(Debug)]
pub enum ActorError {
    /// The actor's event loop has stopped, the message was not delivered.
    Closed,
    /// The message was delivered but the handler never answered, usually
    /// because it panicked.
    NoAnswer(oneshot::error::RecvError),
}

impl fmt::Display for ActorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "actor is not running"),
            Self::NoAnswer(why) => write!(f, "actor did not answer: {}", why),
        }
    }
}

impl Error for ActorError {}

impl From<oneshot::error::RecvError> for ActorError {
    fn from(why: oneshot::error::RecvError) -> Self {
        Self::NoAnswer(why)
    }
}
