/// Words whose plural form equals the singular.
const UNCOUNTABLE: [&str; 8] = [
    "data",
    "equipment",
    "information",
    "metadata",
    "news",
    "series",
    "sheep",
    "species",
];

/// Name of the root field returning a single entity: the type name with its
/// first character lowercased.
pub fn singular_field_name(type_name: &str) -> String {
    let mut chars = type_name.chars();

    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Name of the root field returning a collection of entities.
///
/// If pluralizing does not change the name, `_collection` is appended so the
/// two root fields never clash.
pub fn plural_field_name(type_name: &str) -> String {
    let singular = singular_field_name(type_name);
    let plural = pluralize(&singular);

    if plural == singular {
        format!("{singular}_collection")
    } else {
        plural
    }
}

/// Pluralize the last word of a camelCase identifier.
fn pluralize(word: &str) -> String {
    let last_word_start = word
        .char_indices()
        .filter(|(_, ch)| ch.is_uppercase())
        .map(|(idx, _)| idx)
        .last()
        .unwrap_or(0);
    let last_word = word[last_word_start..].to_lowercase();

    if UNCOUNTABLE.contains(&last_word.as_str()) {
        return word.to_string();
    }

    if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| last_word.ends_with(suffix))
    {
        return format!("{word}es");
    }

    if let Some(stem) = word.strip_suffix('y') {
        if !stem.is_empty() && !stem.ends_with(|ch: char| "aeiouAEIOU".contains(ch)) {
            return format!("{stem}ies");
        }
    }

    format!("{word}s")
}

#[cfg(test)]
mod tests {
    use {super::*, test_case::test_case};

    #[test_case("CollateralLock", "collateralLock", "collateralLocks")]
    #[test_case("MockUSDCContract", "mockUSDCContract", "mockUSDCContracts")]
    #[test_case("TransferSingleEvent", "transferSingleEvent", "transferSingleEvents")]
    #[test_case("Listing", "listing", "listings")]
    #[test_case("Address", "address", "addresses")]
    #[test_case("Registry", "registry", "registries")]
    #[test_case("Day", "day", "days")]
    #[test_case("VehicleMetadata", "vehicleMetadata", "vehicleMetadata_collection")]
    fn naming_root_fields(type_name: &str, singular: &str, plural: &str) {
        assert_eq!(singular_field_name(type_name), singular);
        assert_eq!(plural_field_name(type_name), plural);
    }
}
