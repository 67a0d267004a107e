use std::borrow::Cow;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{body::Incoming, Request, Response, Uri};

use crate::exchange::{Exchange, ExchangeError};

pub const API_PATH: &str = "/api";
pub const API_UNAVAILABLE_BODY: &str = "There is no API available as of now....";
pub const GREETING_BODY: &str = "hellow World...";

/// The check-and-respond step.
///
/// `/api` ends the exchange with the API notice and then falls through to the
/// greeting, whose `end` fails because the exchange is already closed. That
/// error is discarded unlogged.
pub fn respond(exchange: &mut Exchange, target: &str) {
    exchange.begin();
    if target == API_PATH {
        let _ = exchange.end(API_UNAVAILABLE_BODY);
    }
    let _ = exchange.end(GREETING_BODY);
}

/// hyper service entry point. Method, headers and body are never looked at.
pub async fn handle(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, ExchangeError> {
    let target = request_target(req.uri());
    tracing::debug!(method = %req.method(), target = %target, "Request");

    let mut exchange = Exchange::accept();
    respond(&mut exchange, &target);
    exchange.into_response()
}

/// The request target as the client wrote it: path plus query for
/// origin-form, the whole URI for absolute-form.
pub fn request_target(uri: &Uri) -> Cow<'_, str> {
    match (uri.scheme(), uri.path_and_query()) {
        (None, Some(path_and_query)) => Cow::Borrowed(path_and_query.as_str()),
        _ => Cow::Owned(uri.to_string()),
    }
}
