use std::borrow::Cow;
use std::hash::{Hash, Hasher};

/// A stable element identifier.
///
/// `id` is the value used for every lookup; `0` never names an element. Two ids compare equal
/// when their `id` values match, whatever label produced them.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Id {
    pub id: u32,
    pub offset: u32,
    pub base_id: u32,
    /// The label the id was hashed from. Empty for anonymous elements.
    pub label: Cow<'static, str>,
}

impl Id {
    /// Creates an id from `label`.
    ///
    /// This id is global and must be unique across the entire layout.
    #[inline]
    pub fn new(label: impl Into<Cow<'static, str>>) -> Id {
        hash_string(label, 0, 0)
    }

    /// Creates an id from `label` and `index`, for repeated elements sharing a label.
    #[inline]
    pub fn new_index(label: impl Into<Cow<'static, str>>, index: u32) -> Id {
        hash_string(label, index, 0)
    }

    /// Creates an id that only has to be unique below the element with id `parent_id`.
    #[inline]
    pub fn new_local(label: impl Into<Cow<'static, str>>, parent_id: u32) -> Id {
        hash_string(label, 0, parent_id)
    }

    #[inline]
    pub fn new_index_local(label: impl Into<Cow<'static, str>>, index: u32, parent_id: u32) -> Id {
        hash_string(label, index, parent_id)
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Id {}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl From<&'static str> for Id {
    fn from(label: &'static str) -> Self {
        Id::new(label)
    }
}

impl From<(&'static str, u32)> for Id {
    fn from((label, index): (&'static str, u32)) -> Self {
        Id::new_index(label, index)
    }
}

#[inline]
pub(crate) fn mix(hash: u32, value: u32) -> u32 {
    let hash = hash.wrapping_add(value);
    let hash = hash.wrapping_add(hash << 10);
    hash ^ (hash >> 6)
}

#[inline]
pub(crate) fn finalize(hash: u32) -> u32 {
    let hash = hash.wrapping_add(hash << 3);
    let hash = hash ^ (hash >> 11);
    hash.wrapping_add(hash << 15)
}

/// Hashes `label` seeded with `seed`, then mixes in `offset`.
///
/// `base_id` is the hash of the label alone, so every indexed id of one label shares it.
pub fn hash_string(label: impl Into<Cow<'static, str>>, offset: u32, seed: u32) -> Id {
    let label = label.into();
    let base = label.bytes().fold(seed, |hash, byte| mix(hash, byte as u32));
    let hash = mix(base, offset);
    Id {
        id: finalize(hash).wrapping_add(1),
        offset,
        base_id: finalize(base).wrapping_add(1),
        label,
    }
}

/// Id of the `offset`-th anonymous child of the element with id `seed`.
pub fn hash_number(offset: u32, seed: u32) -> Id {
    let hash = mix(seed, offset.wrapping_add(48));
    Id {
        id: finalize(hash).wrapping_add(1),
        offset,
        base_id: seed,
        label: Cow::Borrowed(""),
    }
}
