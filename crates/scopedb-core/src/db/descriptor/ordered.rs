use derive_more::{Deref, IntoIterator};
use indexmap::{IndexMap, map::Entry};
use serde::{
    Deserialize, Deserializer,
    de::{MapAccess, Visitor},
};
use std::{fmt, marker::PhantomData};

///
/// OrderedMap
///
/// String-keyed map that keeps declaration order. Filter clause order and
/// custom sort arms follow the order keys appear in the descriptor.
///

#[derive(Clone, Debug, Deref, Eq, IntoIterator, PartialEq)]
pub struct OrderedMap<V>(#[into_iterator(owned, ref)] IndexMap<String, V>);

impl<V> OrderedMap<V> {
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Insert or replace an entry; a replaced entry keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        self.0.insert(key.into(), value);
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(key, value)| (key.into(), value)).collect())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map with unique string keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = IndexMap::with_capacity(access.size_hint().unwrap_or(0));

        while let Some((key, value)) = access.next_entry::<String, V>()? {
            match entries.entry(key) {
                Entry::Occupied(entry) => {
                    return Err(serde::de::Error::custom(format!(
                        "duplicate key '{}'",
                        entry.key()
                    )));
                }
                Entry::Vacant(entry) => {
                    entry.insert(value);
                }
            }
        }

        Ok(OrderedMap(entries))
    }
}
