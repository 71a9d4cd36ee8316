mod attestation;
mod auth;
mod cose;
mod register;
#[cfg(test)]
pub(crate) mod test_utils;
mod types;
mod useragent;
