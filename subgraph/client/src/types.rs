use {
    serde::{Deserialize, Serialize},
    strum_macros::{Display, EnumString},
};

/// The block a query runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockHeight {
    /// `0x`-prefixed block hash.
    Hash(String),
    Number(i32),
    /// The latest block, provided the subgraph has indexed at least this far.
    NumberGte(i32),
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubgraphErrorPolicy {
    Allow,
    #[default]
    Deny,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPointer {
    pub number: i32,
    pub hash: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub parent_hash: Option<String>,
}

/// Indexing status, as returned by `_meta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub block: BlockPointer,
    pub deployment: String,
    pub has_indexing_errors: bool,
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json, test_case::test_case};

    #[test_case(BlockHeight::Hash("0xab".to_string()), json!({ "hash": "0xab" }); "hash")]
    #[test_case(BlockHeight::Number(7), json!({ "number": 7 }); "number")]
    #[test_case(BlockHeight::NumberGte(7), json!({ "number_gte": 7 }); "number gte")]
    fn block_height_wire_format(block: BlockHeight, expected: serde_json::Value) {
        assert_eq!(serde_json::to_value(&block).unwrap(), expected);
    }

    #[test]
    fn error_policy_defaults_to_deny() {
        assert_eq!(SubgraphErrorPolicy::default(), SubgraphErrorPolicy::Deny);
        assert_eq!(SubgraphErrorPolicy::Allow.to_string(), "allow");
        assert_eq!(serde_json::to_value(SubgraphErrorPolicy::Deny).unwrap(), json!("deny"));
    }
}
