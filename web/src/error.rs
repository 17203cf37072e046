use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::*;

use sse::error::{Error as SseError, ErrorKind as SseErrorKind};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(SseError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.0)
    }
}

// The body is the hub's own message, which clients may show as-is.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self.0.error_kind {
            SseErrorKind::UnknownClient
            | SseErrorKind::UnknownChannel
            | SseErrorKind::NotSubscribed => StatusCode::NOT_FOUND,
            SseErrorKind::InvalidChannel => StatusCode::BAD_REQUEST,
            SseErrorKind::Serialization => {
                error!("Channel request failed: {:?}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<SseError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_kinds() {
        for kind in [
            SseErrorKind::UnknownClient,
            SseErrorKind::UnknownChannel,
            SseErrorKind::NotSubscribed,
        ] {
            let response = Error::from(kind).into_response();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn test_invalid_channel_is_bad_request() {
        let response = Error::from(SseErrorKind::InvalidChannel).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
