use std::ops::Deref;

use num_traits::{ToBytes, Unsigned};

/// An owned, variable length key.
///
/// Integers encode big-endian so that byte order matches numeric order; signed integers have
/// their sign bit flipped for the same reason. Strings are null terminated, which keeps any
/// string key from being a prefix of another.
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct VectorKey {
    data: Box<[u8]>,
}

impl VectorKey {
    pub fn new_from_slice(data: &[u8]) -> Self {
        Self { data: data.into() }
    }

    pub fn new_from_vec(data: Vec<u8>) -> Self {
        Self {
            data: data.into_boxed_slice(),
        }
    }

    pub fn new_from_str(s: &str) -> Self {
        let mut data = Vec::with_capacity(s.len() + 1);
        data.extend_from_slice(s.as_bytes());
        data.push(0);
        Self::new_from_vec(data)
    }

    pub fn new_from_unsigned<T: Unsigned + ToBytes>(un: T) -> Self {
        Self::new_from_slice(un.to_be_bytes().as_ref())
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Deref for VectorKey {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl AsRef<[u8]> for VectorKey {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl From<&[u8]> for VectorKey {
    fn from(data: &[u8]) -> Self {
        Self::new_from_slice(data)
    }
}

impl From<Vec<u8>> for VectorKey {
    fn from(data: Vec<u8>) -> Self {
        Self::new_from_vec(data)
    }
}

impl<const N: usize> From<[u8; N]> for VectorKey {
    fn from(data: [u8; N]) -> Self {
        Self::new_from_slice(&data)
    }
}

impl<const N: usize> From<&[u8; N]> for VectorKey {
    fn from(data: &[u8; N]) -> Self {
        Self::new_from_slice(data)
    }
}

impl From<&VectorKey> for VectorKey {
    fn from(key: &VectorKey) -> Self {
        key.clone()
    }
}

impl From<String> for VectorKey {
    fn from(data: String) -> Self {
        Self::new_from_str(&data)
    }
}

impl From<&String> for VectorKey {
    fn from(data: &String) -> Self {
        Self::new_from_str(data)
    }
}

impl From<&str> for VectorKey {
    fn from(data: &str) -> Self {
        Self::new_from_str(data)
    }
}

macro_rules! impl_from_unsigned {
    ( $($t:ty),* ) => {
    $(
    impl From< $t > for VectorKey
    {
        fn from(data: $t) -> Self {
            VectorKey::new_from_unsigned(data)
        }
    }
    impl From< &$t > for VectorKey
    {
        fn from(data: &$t) -> Self {
            (*data).into()
        }
    }
    ) *
    }
}
impl_from_unsigned!(u8, u16, u32, u64, usize, u128);

macro_rules! impl_from_signed {
    ( $( $t:ty => $tu:ty ),* ) => {
    $(
    impl From< $t > for VectorKey
    {
        fn from(val: $t) -> Self {
            let flipped = (val as $tu) ^ (1 << (<$tu>::BITS - 1));
            VectorKey::new_from_unsigned(flipped)
        }
    }
    impl From< &$t > for VectorKey
    {
        fn from(val: &$t) -> Self {
            (*val).into()
        }
    }
    ) *
    }
}
impl_from_signed!(i8 => u8, i16 => u16, i32 => u32, i64 => u64, isize => usize, i128 => u128);
