use std::hash::Hasher;

use crate::hash::{Canonical, Hashable};
use crate::node::Node;

macro_rules! impl_write_le {
    ($($ty:ident,)*) => {$(
        impl<H: Hasher> Hashable<H> for $ty {
            fn hash(&self, state: &mut H) {
                state.write(&self.to_le_bytes())
            }
        }
    )*}
}

impl_write_le! {
    u8,
    u16,
    u32,
    u64,
    u128,
    i8,
    i16,
    i32,
    i64,
    i128,
}

// Pointer-sized integers are widened so the form does not depend on the target.
impl<H: Hasher> Hashable<H> for usize {
    fn hash(&self, state: &mut H) {
        state.write(&(*self as u64).to_le_bytes())
    }
}

impl<H: Hasher> Hashable<H> for isize {
    fn hash(&self, state: &mut H) {
        state.write(&(*self as i64).to_le_bytes())
    }
}

impl<H: Hasher> Hashable<H> for bool {
    fn hash(&self, state: &mut H) {
        state.write(&[u8::from(*self)])
    }
}

impl<H: Hasher> Hashable<H> for char {
    fn hash(&self, state: &mut H) {
        state.write(&u32::from(*self).to_le_bytes())
    }
}

impl<H: Hasher> Hashable<H> for str {
    fn hash(&self, state: &mut H) {
        state.write(self.as_bytes());
    }
}

impl<H: Hasher> Hashable<H> for String {
    fn hash(&self, state: &mut H) {
        state.write(self.as_bytes());
    }
}

impl<H: Hasher> Hashable<H> for [u8] {
    fn hash(&self, state: &mut H) {
        state.write(self);
    }
}

impl<H: Hasher> Hashable<H> for Vec<u8> {
    fn hash(&self, state: &mut H) {
        state.write(self);
    }
}

impl<H: Hasher, const N: usize> Hashable<H> for [u8; N] {
    fn hash(&self, state: &mut H) {
        state.write(self);
    }
}

// A node is already canonical.
impl<H: Hasher> Hashable<H> for Node {
    fn hash(&self, state: &mut H) {
        state.write(self.as_bytes());
    }
}

impl<'a, H: Hasher, T: ?Sized + Hashable<H>> Hashable<H> for &'a T {
    fn hash(&self, state: &mut H) {
        (**self).hash(state);
    }
}

impl<'a, H: Hasher, T: ?Sized + Hashable<H>> Hashable<H> for &'a mut T {
    fn hash(&self, state: &mut H) {
        (**self).hash(state);
    }
}

/// Writes `u64_le(len) || bytes` of one tuple component.
fn write_prefixed<H: Hasher, T: ?Sized + Hashable<Canonical>>(value: &T, state: &mut H) {
    let mut sink = Canonical::new();
    value.hash(&mut sink);
    let bytes = sink.into_node();
    state.write(&(bytes.len() as u64).to_le_bytes());
    state.write(bytes.as_bytes());
}

macro_rules! impl_hash_tuple {
    ( $($name:ident)+) => (
        impl<Z: Hasher, $($name: Hashable<Canonical>),*> Hashable<Z> for ($($name,)*) {
            #[allow(non_snake_case)]
            fn hash(&self, state: &mut Z) {
                let ($(ref $name,)*) = *self;
                $(write_prefixed($name, state);)*
            }
        }
    );
}

impl_hash_tuple! { A }
impl_hash_tuple! { A B }
impl_hash_tuple! { A B C }
impl_hash_tuple! { A B C D }
impl_hash_tuple! { A B C D E }
impl_hash_tuple! { A B C D E F }
impl_hash_tuple! { A B C D E F G }
impl_hash_tuple! { A B C D E F G H }

#[cfg(test)]
mod tests {
    use crate::hash::canonical;

    #[test]
    fn test_integers_little_endian() {
        assert_eq!(canonical(&1u16).as_bytes(), &[1, 0]);
        assert_eq!(canonical(&0x0102_0304u32).as_bytes(), &[4, 3, 2, 1]);
        assert_eq!(canonical(&-1i8).as_bytes(), &[0xff]);
        assert_eq!(canonical(&7usize).as_bytes(), &7u64.to_le_bytes());
        assert_eq!(canonical(&-7isize).as_bytes(), &(-7i64).to_le_bytes());
    }

    #[test]
    fn test_strings_and_bytes() {
        assert_eq!(canonical("abc").as_bytes(), b"abc");
        assert_eq!(canonical(&String::from("abc")), canonical("abc"));
        assert_eq!(canonical(&b"abc"[..]), canonical("abc"));
        assert_eq!(canonical(&vec![1u8, 2, 3]), canonical(&[1u8, 2, 3]));
        assert!(canonical("").is_empty());
    }

    #[test]
    fn test_bool_and_char() {
        assert_eq!(canonical(&true).as_bytes(), &[1]);
        assert_eq!(canonical(&false).as_bytes(), &[0]);
        assert_eq!(canonical(&'a').as_bytes(), &97u32.to_le_bytes());
    }

    #[test]
    fn test_references_are_transparent() {
        let s = "leaf";
        let r = &s;
        assert_eq!(canonical(&r), canonical(s));
    }

    #[test]
    fn test_tuples_are_unambiguous() {
        assert_ne!(canonical(&("ab", "c")), canonical(&("a", "bc")));

        let mut expected = Vec::new();
        expected.extend_from_slice(&2u64.to_le_bytes());
        expected.extend_from_slice(b"ab");
        expected.extend_from_slice(&4u64.to_le_bytes());
        expected.extend_from_slice(&9u32.to_le_bytes());
        assert_eq!(canonical(&("ab", 9u32)).as_bytes(), expected.as_slice());
    }
}
