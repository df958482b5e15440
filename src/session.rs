//! Session-domain token secrets, user profiles, and capability predicates.

pub mod capability;
pub mod token;
pub mod user;

pub use capability::*;
pub use token::*;
pub use user::*;
