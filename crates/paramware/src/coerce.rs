//! Textual coercion of source strings onto field slots.
//!
//! Scalars take the first source string; lists take one element per source
//! string. A list is parsed into a temporary buffer first, so a failure
//! partway through leaves the destination untouched. An empty source set
//! leaves the slot untouched as well.

use std::str::FromStr;

use crate::error::CoerceError;
use crate::shape::{ListSlot, ScalarSlot, SlotMut};

fn parse_one<T: FromStr>(kind: &'static str, text: &str) -> Result<T, CoerceError> {
    text.parse().map_err(|_| CoerceError::new(kind, text))
}

fn parse_list<T: FromStr>(
    kind: &'static str,
    dest: &mut Vec<T>,
    values: &[&str],
) -> Result<(), CoerceError> {
    let mut parsed = Vec::with_capacity(values.len());
    for text in values {
        parsed.push(parse_one(kind, text)?);
    }
    *dest = parsed;
    Ok(())
}

/// Assigns source strings to a scalar or list slot.
///
/// # Errors
///
/// Returns a [`CoerceError`] naming the offending text when any source
/// string does not parse as the slot's scalar kind. File, cookie and
/// record slots also report an error; the schema compiler never routes
/// string sources to them.
pub fn assign(slot: &mut SlotMut<'_>, values: &[&str]) -> Result<(), CoerceError> {
    if values.is_empty() {
        return Ok(());
    }
    match slot {
        SlotMut::Scalar(scalar) => {
            let text = values[0];
            match scalar {
                ScalarSlot::String(v) => **v = text.to_owned(),
                ScalarSlot::Bool(v) => **v = parse_one("bool", text)?,
                ScalarSlot::I8(v) => **v = parse_one("i8", text)?,
                ScalarSlot::I16(v) => **v = parse_one("i16", text)?,
                ScalarSlot::I32(v) => **v = parse_one("i32", text)?,
                ScalarSlot::I64(v) => **v = parse_one("i64", text)?,
                ScalarSlot::U8(v) => **v = parse_one("u8", text)?,
                ScalarSlot::U16(v) => **v = parse_one("u16", text)?,
                ScalarSlot::U32(v) => **v = parse_one("u32", text)?,
                ScalarSlot::U64(v) => **v = parse_one("u64", text)?,
                ScalarSlot::F32(v) => **v = parse_one("f32", text)?,
                ScalarSlot::F64(v) => **v = parse_one("f64", text)?,
            }
            Ok(())
        }
        SlotMut::List(list) => match list {
            ListSlot::String(v) => {
                **v = values.iter().map(|s| (*s).to_owned()).collect();
                Ok(())
            }
            ListSlot::Bool(v) => parse_list("bool", v, values),
            ListSlot::I8(v) => parse_list("i8", v, values),
            ListSlot::I16(v) => parse_list("i16", v, values),
            ListSlot::I32(v) => parse_list("i32", v, values),
            ListSlot::I64(v) => parse_list("i64", v, values),
            ListSlot::U8(v) => parse_list("u8", v, values),
            ListSlot::U16(v) => parse_list("u16", v, values),
            ListSlot::U32(v) => parse_list("u32", v, values),
            ListSlot::U64(v) => parse_list("u64", v, values),
            ListSlot::F32(v) => parse_list("f32", v, values),
            ListSlot::F64(v) => parse_list("f64", v, values),
        },
        SlotMut::File(_) | SlotMut::Cookie(_) | SlotMut::Record(_) => Err(CoerceError::new(
            "string source",
            values[0],
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::BindValue;

    #[test]
    fn test_scalar_takes_first_value() {
        let mut n = 0_u32;
        assign(&mut n.slot_mut(), &["42", "99"]).unwrap();
        assert_eq!(n, 42);
    }

    #[test]
    fn test_scalar_parse_failure_names_kind_and_text() {
        let mut n = 7_i64;
        let e = assign(&mut n.slot_mut(), &["banana"]).unwrap_err();
        assert_eq!(e.to_string(), "cannot parse `banana` as i64");
        assert_eq!(n, 7);
    }

    #[test]
    fn test_bool_and_floats() {
        let mut b = false;
        assign(&mut b.slot_mut(), &["true"]).unwrap();
        assert!(b);

        let mut f = 0.0_f64;
        assign(&mut f.slot_mut(), &["2.5"]).unwrap();
        assert!((f - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_list_takes_all_values() {
        let mut v: Vec<u16> = Vec::new();
        assign(&mut v.slot_mut(), &["1", "2", "3"]).unwrap();
        assert_eq!(v, vec![1, 2, 3]);
    }

    #[test]
    fn test_list_failure_leaves_destination_unmodified() {
        let mut v: Vec<u16> = vec![9];
        assert!(assign(&mut v.slot_mut(), &["1", "oops", "3"]).is_err());
        assert_eq!(v, vec![9]);
    }

    #[test]
    fn test_empty_sources_leave_slot_untouched() {
        let mut s = String::from("keep");
        assign(&mut s.slot_mut(), &[]).unwrap();
        assert_eq!(s, "keep");
    }

    #[test]
    fn test_string_list_replaces_contents() {
        let mut v: Vec<String> = vec!["old".into()];
        assign(&mut v.slot_mut(), &["a", "b"]).unwrap();
        assert_eq!(v, vec!["a".to_owned(), "b".to_owned()]);
    }
}
