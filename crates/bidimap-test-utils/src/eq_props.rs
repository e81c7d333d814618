use std::fmt;

/// Assert equality properties.
///
/// Map equality ignores insertion order, so it is implemented by hand and is
/// not obviously symmetric or reflexive. Tests must check that it is.
#[allow(clippy::eq_op)]
pub fn assert_eq_props<T: Eq + fmt::Debug>(a: T, b: T) {
    assert_eq!(a, a, "a == a");
    assert_eq!(b, b, "b == b");
    assert_eq!(a, b, "a == b");
    assert_eq!(b, a, "b == a");
}

/// Assert inequality properties, along with reflexivity.
#[allow(clippy::eq_op)]
pub fn assert_ne_props<T: Eq + fmt::Debug>(a: T, b: T) {
    assert_eq!(a, a, "a == a");
    assert_eq!(b, b, "b == b");
    assert_ne!(a, b, "a != b");
    assert_ne!(b, a, "b != a");
}
