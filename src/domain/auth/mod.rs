//! Auth domain module: user roles, sessions and registration

mod registration;
mod session;

pub use registration::{
    username_from_email, validate_email, AccountProfile, Registration,
    DEFAULT_RECRUITER_POSITION,
};
pub use session::{Session, StoredUser, UserType};
