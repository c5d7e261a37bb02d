//! ClipSync Identity
//!
//! The session side of the system. Every other component only ever *reads*
//! the current identity through [`SessionProvider`]; sign-in, sign-up and
//! sign-out go through an [`AuthProvider`].
//!
//! [`LocalAuthProvider`] is a file-backed implementation of both traits used
//! by the CLI and the test suites. [`AuthForm`] carries the login/register
//! form logic, including the mapping from provider error codes to the
//! messages a user sees.

pub mod error;
pub mod form;
pub mod local;
pub mod session;

pub use error::*;
pub use form::*;
pub use local::*;
pub use session::*;
