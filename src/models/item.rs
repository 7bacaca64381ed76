use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::item::Item as DomainItem;
use crate::domain::types::{ItemId, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::items)]
pub struct Item {
    pub id: i32,
    pub recorded_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::items)]
pub struct NewItem {
    pub recorded_at: NaiveDateTime,
}

impl TryFrom<Item> for DomainItem {
    type Error = TypeConstraintError;

    fn try_from(item: Item) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ItemId::try_from(item.id)?,
            timestamp: item.recorded_at,
        })
    }
}
