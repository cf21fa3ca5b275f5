//! Wire models for the admin API, split into resource-specific modules.
//!
//! Every type here mirrors a JSON shape the backend returns. Decoding is strict
//! for identity fields (ids, e-mail, timestamps) and deliberately loose for the
//! numeric minute fields, which the transformer absorbs with fallbacks.

pub mod common;
pub mod prompt;
pub mod support;
pub mod user;

pub use common::*;
pub use prompt::*;
pub use support::*;
pub use user::*;
