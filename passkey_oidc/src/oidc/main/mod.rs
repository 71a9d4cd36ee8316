mod core;
mod idtoken;
mod pkce;
#[cfg(test)]
pub(crate) mod test_utils;
mod token;
