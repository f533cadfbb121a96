//! Local credential store adapters

mod json_file;

pub use json_file::JsonCredentialStore;
