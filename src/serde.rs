use alloc::vec::Vec;
use core::{fmt, marker::PhantomData};
use serde_core::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, SeqAccess, Visitor},
    ser::SerializeSeq,
};

use crate::FixedVec;

impl<T: Serialize> Serialize for FixedVec<T> {
    /// Serialize a `FixedVec` as a sequence of its live elements.
    ///
    /// The capacity is not part of the format.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FixedVec<T> {
    /// Deserialize a `FixedVec` from a sequence.
    ///
    /// The capacity of the result equals the sequence length.
    #[inline]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<T>::deserialize(deserializer).map(FixedVec::from_vec)
    }
}

struct BoundedVisitor<T> {
    capacity: usize,
    _marker: PhantomData<T>,
}

impl<'de, T: Deserialize<'de>> Visitor<'de> for BoundedVisitor<T> {
    type Value = FixedVec<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a sequence of at most {} elements", self.capacity)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        if let Some(hint) = seq.size_hint() {
            if hint > self.capacity {
                return Err(de::Error::invalid_length(hint, &self));
            }
        }

        let mut vec = FixedVec::try_with_capacity(self.capacity)
            .map_err(<A::Error as de::Error>::custom)?;

        while let Some(element) = seq.next_element()? {
            if vec.push(element).is_err() {
                return Err(de::Error::custom(format_args!(
                    "FixedVec capacity {} exceeded while deserializing sequence",
                    self.capacity
                )));
            }
        }

        Ok(vec)
    }
}

impl<T> FixedVec<T> {
    /// Deserialize a sequence into a vector with exactly `capacity` slots.
    ///
    /// Fails with a custom error if the sequence holds more than `capacity` elements.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fixedvec::FixedVec;
    /// let mut de = serde_json::Deserializer::from_str("[1, 2]");
    /// let vec = FixedVec::<u8>::deserialize_with_capacity(&mut de, 4).unwrap();
    /// assert_eq!(vec, [1, 2]);
    /// assert_eq!(vec.capacity(), 4);
    /// ```
    pub fn deserialize_with_capacity<'de, D>(deserializer: D, capacity: usize) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        deserializer.deserialize_seq(BoundedVisitor {
            capacity,
            _marker: PhantomData,
        })
    }
}
