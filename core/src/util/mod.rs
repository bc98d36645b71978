pub mod cross_platform;
#[cfg(test)]
pub(crate) mod defer;
pub mod log;
pub(crate) mod rand;
#[cfg(test)]
pub(crate) mod test_util;
