use crate::{EntityType, EnumDef, EnumValueDef};

/// Derive the `<Entity>_orderBy` enum: one value per declared field.
pub fn order_by_enum(entity: &EntityType) -> EnumDef {
    EnumDef {
        name: entity.order_by_type_name(),
        description: None,
        values: entity
            .fields
            .iter()
            .map(|field| EnumValueDef::new(&field.name))
            .collect(),
    }
}
