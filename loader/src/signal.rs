//! Completion notification for an engine load.

use futures::future::{BoxFuture, Shared};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

/// A one-time broadcast that resolves once a load has finished, regardless of its outcome.
///
/// Callers that only need to know the load is done can await a [Signal] and then inspect
/// [crate::Loader::state]. Awaiting a [Signal] drives the load just like awaiting the
/// [crate::Handle] it came from.
///
/// _Note: Polling the same `Signal` after it has resolved will panic. When waiting on a
/// reference to a `Signal`, ensure it is either fused or not polled again after it has
/// yielded a result._
#[derive(Clone)]
pub enum Signal {
    /// A signal that resolves when the load completes.
    Open(Shared<BoxFuture<'static, ()>>),
    /// A signal for a load that had already completed.
    Closed,
}

impl Future for Signal {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut *self {
            Signal::Open(inner) => Pin::new(inner).poll(cx),
            Signal::Closed => Poll::Ready(()),
        }
    }
}
