#![forbid(unsafe_code)]

mod context;
mod issues;
mod members;
mod projects;
