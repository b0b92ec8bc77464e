//! Collaborator seams used while negotiating the access granted to a client.
//!
//! These traits carry no behavior of their own. They name the points where an
//! authorization gateway plugs in its own storage and session handling.

#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_must_use
)]
#![forbid(unsafe_code)]

mod directory;
mod policy;
mod resolver;

pub use directory::Directory;
pub use policy::Policy;
pub use resolver::Resolver;
