#![deny(missing_docs)]

//! # reel-core -- Foundational Types for Reel
//!
//! Every other crate in the workspace depends on this one. It has no
//! internal dependencies and no I/O -- only `serde`, `thiserror`, `chrono`
//! and `uuid` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Validated newtypes.** An [`EmailAddress`] can only be built through
//!    [`EmailAddress::parse`], so code holding one never re-checks the format.
//!
//! 2. **One definition of the account contract.** [`AccountRecord`],
//!    [`AccountIdentity`] and [`LookupResult`] are shared by the API server and
//!    the client so the wire shape cannot drift.
//!
//! 3. **Catalog payloads stay catalog-shaped.** [`MovieSummary`] and
//!    [`MovieDetails`] keep the external catalog's field names and tolerate
//!    missing fields.

pub mod account;
pub mod credentials;
pub mod error;
pub mod identity;
pub mod movie;
pub mod provider;

pub use account::{AccountIdentity, AccountRecord, LookupResult};
pub use credentials::{
    validate_display_name, validate_password, validate_password_pair, SignUpForm, ValidatedSignUp,
    NAME_MAX_LEN, PASSWORD_MAX_LEN, PASSWORD_MIN_LEN,
};
pub use error::ValidationError;
pub use identity::{first_name, greeting_name, EmailAddress, UserId};
pub use movie::{
    CastMember, Credits, CrewMember, Genre, MovieDetails, MoviePage, MovieSummary, PosterSize,
    ProductionCountry, IMAGE_BASE_URL,
};
pub use provider::SocialProvider;
