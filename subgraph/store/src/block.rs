use {
    serde::{Deserialize, Deserializer, Serialize, Serializer, de},
    std::fmt::{self, Formatter},
};

pub type BlockNumber = i32;

/// An indexed block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPtr {
    pub number: BlockNumber,
    #[serde(with = "hex_bytes")]
    pub hash: Vec<u8>,
    #[serde(default, with = "hex_bytes::option", skip_serializing_if = "Option::is_none")]
    pub parent_hash: Option<Vec<u8>>,
    /// Seconds since the UNIX epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl BlockPtr {
    pub fn new(number: BlockNumber, hash: Vec<u8>) -> Self {
        Self {
            number,
            hash,
            parent_hash: None,
            timestamp: None,
        }
    }

    pub fn hash_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.hash))
    }
}

impl fmt::Display for BlockPtr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.number, self.hash_hex())
    }
}

/// The block a query runs against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BlockConstraint {
    #[default]
    Latest,
    Hash(Vec<u8>),
    Number(BlockNumber),
    /// The latest block, provided the subgraph has reached the number.
    NumberGte(BlockNumber),
}

impl BlockConstraint {
    /// Whether the constraint names an exact block number. Hashes are not
    /// reported for such queries.
    pub fn is_by_number(&self) -> bool {
        matches!(self, BlockConstraint::Number(_))
    }
}

/// Half-open block range `[start, end)` in which a version of an entity is
/// live. An open end means the version is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub start: BlockNumber,
    pub end: Option<BlockNumber>,
}

impl BlockRange {
    pub fn starting_at(start: BlockNumber) -> Self {
        Self { start, end: None }
    }

    pub fn contains(&self, block: BlockNumber) -> bool {
        self.start <= block && self.end.map_or(true, |end| block < end)
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }
}

mod hex_bytes {
    use super::*;

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("0x").unwrap_or(&s);

        hex::decode(digits).map_err(de::Error::custom)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match bytes {
                Some(bytes) => super::serialize(bytes, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            #[derive(Deserialize)]
            struct Wrapper(#[serde(with = "super")] Vec<u8>);

            Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(bytes)| bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, test_case::test_case};

    #[test_case(BlockRange::starting_at(5), 4, false; "before start")]
    #[test_case(BlockRange::starting_at(5), 5, true; "at start")]
    #[test_case(BlockRange { start: 5, end: Some(8) }, 7, true; "inside closed range")]
    #[test_case(BlockRange { start: 5, end: Some(8) }, 8, false; "end is exclusive")]
    fn block_range_membership(range: BlockRange, block: BlockNumber, expect: bool) {
        assert_eq!(range.contains(block), expect);
    }

    #[test]
    fn block_ptr_serializes_hashes_as_hex() {
        let ptr = BlockPtr {
            number: 7,
            hash: vec![0xab, 0x01],
            parent_hash: None,
            timestamp: Some(1_700_000_000),
        };

        let json = serde_json::to_value(&ptr).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "number": 7, "hash": "0xab01", "timestamp": 1_700_000_000 })
        );

        let back: BlockPtr = serde_json::from_value(json).unwrap();
        assert_eq!(back, ptr);
    }
}
