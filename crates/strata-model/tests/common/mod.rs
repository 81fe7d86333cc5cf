#![allow(dead_code)]

use strata_model::{FieldType, Model, ModelDescription};

pub struct Human;
pub struct Child;
pub struct Toy;

impl Model for Human {
    fn describe() -> ModelDescription {
        ModelDescription::new("Human")
            .table("db_humans")
            .field("Name", FieldType::of::<String>())
            .field_with_column("Age", "years", FieldType::of::<u32>())
            .field("Nickname", FieldType::of::<Option<String>>())
            .field("BornAt", FieldType::of::<bson::DateTime>())
            .field("DiedAt", FieldType::of::<Option<bson::DateTime>>())
            .field("Child", FieldType::optional(FieldType::model::<Child>()))
    }
}

impl Model for Child {
    fn describe() -> ModelDescription {
        ModelDescription::new("Child")
            .table("children")
            .field("Name", FieldType::of::<String>())
            .field("FavouriteColour", FieldType::of::<String>())
            .field("Toys", FieldType::list(FieldType::model::<Toy>()))
    }
}

impl Model for Toy {
    fn describe() -> ModelDescription {
        ModelDescription::new("Toy").field("Name", FieldType::of::<String>())
    }
}
