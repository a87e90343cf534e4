#![forbid(unsafe_code)]

mod invite;
mod remove;
mod revoke;
