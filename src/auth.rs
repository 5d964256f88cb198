//! Auth-domain identifiers, scope lists, resource owners, and token models.

pub mod id;
pub mod owner;
pub mod scope;
pub mod token;

pub use id::*;
pub use owner::*;
pub use scope::*;
pub use token::{record::*, secret::*};
