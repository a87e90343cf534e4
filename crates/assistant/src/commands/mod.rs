#![forbid(unsafe_code)]

mod draft;
mod validate;

pub(crate) use draft::*;
pub(crate) use validate::*;
