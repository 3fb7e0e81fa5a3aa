//! Wire shapes shared between the front-end and the content API.
//!
//! [`fetch`] describes the options handed to whatever issues the request,
//! [`content`] describes what comes back from an articles query. Neither
//! module performs any I/O.

pub mod content;
pub mod error;
pub mod fetch;
pub mod nullable;

pub use content::{Article, ArticlesCollection, ArticlesQueryResponse, MediaReference};
pub use error::{Error, Result};
pub use fetch::{
    Credentials, FetchOptions, RequestCache, RequestDirectives, RequestInit, RequestMode,
    RequestRedirect,
};
pub use nullable::Nullable;

pub mod prelude {
    pub use crate::{Article, ArticlesQueryResponse, Error, FetchOptions, Nullable, Result};
}
