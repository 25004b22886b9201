//! An [XConn][crate::x::XConn] implementation backed by the x11rb crate.
use x11rb::rust_connection::RustConnection;

pub mod event;
pub mod xconn;

#[doc(inline)]
pub use xconn::X11rbConnection;

/// Result type for fallible methods using x11rb
pub type Result<T> = std::result::Result<T, X11rbError>;

/// Connect to the X server and wrap the connection for use as the window
/// manager backend.
pub fn new_conn() -> crate::Result<X11rbConnection<RustConnection>> {
    X11rbConnection::new()
}

/// The ways that operations can fail inside the x11rb backend.
#[derive(thiserror::Error, Debug)]
pub enum X11rbError {
    /// Unable to establish a connection to the X server
    #[error(transparent)]
    Connect(#[from] ::x11rb::errors::ConnectError),

    /// The X11 connection broke
    #[error(transparent)]
    Connection(#[from] ::x11rb::errors::ConnectionError),

    /// Could not get X11 request reply
    #[error(transparent)]
    ReplyError(#[from] ::x11rb::errors::ReplyError),

    /// Could not get X11 request reply or could not generate_id()
    #[error(transparent)]
    ReplyOrIdError(#[from] ::x11rb::errors::ReplyOrIdError),

    /// The X11 server does not support the RandR extension
    #[error("the X11 server does not support the RandR extension")]
    MissingRandRSupport,
}

// Allow `?` on raw x11rb results inside [crate::x::XConn] methods without
// chaining conversions at every call site.
macro_rules! forward_conversion {
    ($($err:ty),+) => {
        $(impl From<$err> for crate::Error {
            fn from(e: $err) -> Self {
                crate::Error::X11rb(X11rbError::from(e))
            }
        })+
    };
}

forward_conversion!(
    ::x11rb::errors::ConnectError,
    ::x11rb::errors::ConnectionError,
    ::x11rb::errors::ReplyError,
    ::x11rb::errors::ReplyOrIdError
);
