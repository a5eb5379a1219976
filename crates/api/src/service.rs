//! Abstract remote-service surface for the upload pipeline.
//!
//! The pipeline only ever needs four operations; expressing them as an
//! object-safe trait keeps chunk/upload logic independent of the HTTP
//! stack and testable with in-memory mocks.

use std::future::Future;
use std::pin::Pin;

use crate::{ApiError, Part, Session};

/// Boxed future returned by [`RemoteService`] operations.
pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// The remote operations consumed by the upload pipeline.
pub trait RemoteService: Send + Sync {
    /// Requests a fresh ordered list of pre-signed part destinations for
    /// the given bag. The count is decided server-side; callers consume
    /// the list lazily, front to back.
    fn request_part_urls<'a>(
        &'a self,
        session: &'a Session,
        bag_uuid: &'a str,
    ) -> ServiceFuture<'a, Vec<String>>;

    /// Uploads one part body to a pre-signed destination and returns the
    /// raw content-integrity tag from the response (quotes included, as
    /// the destination sent it).
    fn upload_part<'a>(&'a self, url: &'a str, body: Vec<u8>) -> ServiceFuture<'a, String>;

    /// Reports the ordered part list for a bag to the completion endpoint.
    fn complete_upload<'a>(
        &'a self,
        session: &'a Session,
        bag_uuid: &'a str,
        parts: &'a [Part],
    ) -> ServiceFuture<'a, ()>;

    /// Exchanges the session's refresh token for a new access token,
    /// returning the replacement session.
    fn refresh<'a>(&'a self, session: &'a Session) -> ServiceFuture<'a, Session>;
}
