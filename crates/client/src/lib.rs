#![forbid(unsafe_code)]

mod remote;

pub use remote::RemoteStore;
