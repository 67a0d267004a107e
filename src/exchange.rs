//! One request paired with its single response.
//!
//! An exchange moves `Accepted → Responding → Closed`. Finalizing it with
//! [`Exchange::end`] records the body and closes it; once closed nothing more
//! can be written and further `end` calls fail without touching the body.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

pub const DEFAULT_STATUS: StatusCode = StatusCode::OK;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ExchangeState {
    Accepted,
    Responding,
    Closed,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("exchange was already finalized")]
    AlreadyFinalized,
    #[error("exchange was never finalized")]
    NotFinalized,
}

#[derive(Debug)]
pub struct Exchange {
    state: ExchangeState,
    body: Option<Bytes>,
}

impl Exchange {
    pub fn accept() -> Self {
        Self {
            state: ExchangeState::Accepted,
            body: None,
        }
    }

    /// Marks the request as received. Only has an effect on a fresh exchange.
    pub fn begin(&mut self) {
        if self.state == ExchangeState::Accepted {
            self.state = ExchangeState::Responding;
        }
    }

    pub fn end(&mut self, body: &'static str) -> Result<(), ExchangeError> {
        if self.state == ExchangeState::Closed {
            return Err(ExchangeError::AlreadyFinalized);
        }
        self.body = Some(Bytes::from_static(body.as_bytes()));
        self.state = ExchangeState::Closed;
        Ok(())
    }

    #[cfg(test)]
    pub fn state(&self) -> ExchangeState {
        self.state
    }

    #[cfg(test)]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Builds the wire response: [`DEFAULT_STATUS`] and no headers of our own.
    /// Framing headers are left to the HTTP stack.
    pub fn into_response(self) -> Result<Response<Full<Bytes>>, ExchangeError> {
        let Some(body) = self.body else {
            return Err(ExchangeError::NotFinalized);
        };
        let mut response = Response::new(Full::new(body));
        *response.status_mut() = DEFAULT_STATUS;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt as _;

    #[test]
    fn walks_accepted_responding_closed() {
        let mut exchange = Exchange::accept();
        assert_eq!(exchange.state(), ExchangeState::Accepted);
        exchange.begin();
        assert_eq!(exchange.state(), ExchangeState::Responding);
        exchange.end("done").unwrap();
        assert_eq!(exchange.state(), ExchangeState::Closed);
    }

    #[test]
    fn begin_does_not_reopen_closed_exchange() {
        let mut exchange = Exchange::accept();
        exchange.end("done").unwrap();
        exchange.begin();
        assert_eq!(exchange.state(), ExchangeState::Closed);
    }

    #[test]
    fn first_end_wins() {
        let mut exchange = Exchange::accept();
        exchange.begin();
        assert_eq!(exchange.end("first"), Ok(()));
        assert_eq!(exchange.end("second"), Err(ExchangeError::AlreadyFinalized));
        assert_eq!(exchange.body().unwrap().as_ref(), b"first");
    }

    #[test]
    fn unfinished_exchange_has_no_response() {
        let mut exchange = Exchange::accept();
        exchange.begin();
        assert_eq!(
            exchange.into_response().unwrap_err(),
            ExchangeError::NotFinalized
        );
    }

    #[tokio::test]
    async fn response_uses_default_status_and_no_headers() -> anyhow::Result<()> {
        let mut exchange = Exchange::accept();
        exchange.end("hello")?;
        let response = exchange.into_response()?;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().is_empty());
        let body = response.into_body().collect().await?.to_bytes();
        assert_eq!(body.as_ref(), b"hello");
        Ok(())
    }
}
