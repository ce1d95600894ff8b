//! Typed access to the `a{sv}` results of a successful response.
//!
//! Fields are moved out of the mapping; a field that is absent or has an
//! unexpected type reads as missing.

use crate::transport::Results;
use zvariant::Value;

pub(crate) fn take<T>(results: &mut Results, key: &str) -> Option<T>
where
    T: TryFrom<Value<'static>>,
{
    let value = Value::from(results.remove(key)?);
    match T::try_from(value) {
        Ok(value) => Some(value),
        Err(_) => {
            log::debug!("portal result {key} has an unexpected type");
            None
        }
    }
}

pub(crate) fn take_string(results: &mut Results, key: &str) -> Option<String> {
    take::<String>(results, key)
}

pub(crate) fn take_strings(results: &mut Results, key: &str) -> Option<Vec<String>> {
    take::<Vec<String>>(results, key)
}

pub(crate) fn take_pairs(results: &mut Results, key: &str) -> Option<Vec<(String, String)>> {
    take::<Vec<(String, String)>>(results, key)
}

pub(crate) fn take_u32(results: &mut Results, key: &str) -> Option<u32> {
    take::<u32>(results, key)
}

pub(crate) fn take_dict(results: &mut Results, key: &str) -> Option<Results> {
    take::<Results>(results, key)
}
