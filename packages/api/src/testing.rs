//! Scripted transport for tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use serde_json::Value;

use crate::error::TransportError;
use crate::transport::{ApiRequest, HttpTransport, RawResponse};

#[derive(Default)]
struct Script {
    replies: VecDeque<Result<RawResponse, TransportError>>,
    requests: Vec<ApiRequest>,
}

/// Answers requests from a queue of canned replies and records every request.
///
/// Clones share the queue. Each `send` yields once before answering so that
/// concurrent callers genuinely interleave. Running out of replies is a
/// network failure.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Rc<RefCell<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON reply.
    pub fn reply(&self, status: u16, body: Value) -> &Self {
        self.reply_raw(status, body.to_string())
    }

    pub fn reply_raw(&self, status: u16, body: impl Into<String>) -> &Self {
        self.script
            .borrow_mut()
            .replies
            .push_back(Ok(RawResponse::new(status, body)));
        self
    }

    /// Queue a network failure.
    pub fn fail(&self) -> &Self {
        self.script
            .borrow_mut()
            .replies
            .push_back(Err(TransportError::Network("connection refused".into())));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.script.borrow().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.script.borrow().requests.len()
    }
}

impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportError> {
        self.script.borrow_mut().requests.push(request);
        YieldNow(false).await;
        self.script
            .borrow_mut()
            .replies
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted reply".into())))
    }
}

struct YieldNow(bool);

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}
