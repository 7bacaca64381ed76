use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::{
    domain::{item::Item, types::ItemId},
    models::item::{Item as DbItem, NewItem as DbNewItem},
    repository::{
        ChangeKind, DieselRepository, EntityKind, ItemReader, ItemWriter, StoreChange,
        errors::{RepositoryError, RepositoryResult},
    },
};

impl ItemReader for DieselRepository {
    fn list_items(&self) -> RepositoryResult<Vec<Item>> {
        use crate::schema::items;

        let mut conn = self.conn()?;
        items::table
            .order((items::recorded_at.desc(), items::id.desc()))
            .load::<DbItem>(&mut conn)?
            .into_iter()
            .map(|item| Item::try_from(item).map_err(RepositoryError::from))
            .collect()
    }
}

impl ItemWriter for DieselRepository {
    fn create_item(&self, timestamp: NaiveDateTime) -> RepositoryResult<Item> {
        use crate::schema::items;

        let mut conn = self.conn()?;
        let db_item = diesel::insert_into(items::table)
            .values(&DbNewItem {
                recorded_at: timestamp,
            })
            .get_result::<DbItem>(&mut conn)?;

        let item = Item::try_from(db_item)?;
        self.publish([StoreChange::new(
            EntityKind::Item,
            ChangeKind::Created,
            item.id.get(),
        )]);
        Ok(item)
    }

    fn delete_item(&self, item_id: ItemId) -> RepositoryResult<()> {
        use crate::schema::items;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(items::table.find(item_id.get())).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.publish([StoreChange::new(
            EntityKind::Item,
            ChangeKind::Deleted,
            item_id.get(),
        )]);
        Ok(())
    }
}
