// builders + helpers on top of the core crates
pub mod builders;

#[cfg(feature = "test-utils")]
pub mod test_utils;
