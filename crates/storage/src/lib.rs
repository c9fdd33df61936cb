#![forbid(unsafe_code)]

mod backend;
mod entry;
mod key;
pub mod redirect;
mod store;

pub use backend::StateBackend;
pub use redirect::{STATE_PARAM, authorize_redirect, resolve_callback};
pub use store::StateStore;
