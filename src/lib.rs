pub mod api;
pub mod authenticator;
pub mod authorizer;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod origin;
pub mod session;
pub mod store;

pub use api::{AuthorizedClient, RequestInterceptor, ReqwestTransport, Transport};
pub use authenticator::{Authenticator, TokenAuthenticator, TokenOptions};
pub use authorizer::{Authorizer, BearerAuthorizer, TokenAuthorizer};
pub use error::{AuthError, Result};
pub use models::{Authentication, Credentials, SessionData, SessionState};
pub use origin::OriginMatcher;
pub use session::{Session, SessionEvent, SessionHandle};
pub use store::{EphemeralStore, FilesystemStore, Store};
