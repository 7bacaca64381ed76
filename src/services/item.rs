use chrono::Utc;

use crate::domain::item::Item;
use crate::domain::types::ItemId;
use crate::repository::{ItemReader, ItemWriter};
use crate::services::{ServiceError, ServiceResult};

pub fn list_items<R>(repo: &R) -> ServiceResult<Vec<Item>>
where
    R: ItemReader + ?Sized,
{
    repo.list_items().map_err(ServiceError::from)
}

/// Records a new item stamped with the current time.
pub fn add_item<R>(repo: &R) -> ServiceResult<Item>
where
    R: ItemWriter + ?Sized,
{
    repo.create_item(Utc::now().naive_utc()).map_err(|err| {
        log::error!("Failed to add an item: {err}");
        ServiceError::from(err)
    })
}

pub fn delete_item<R>(repo: &R, item_id: i32) -> ServiceResult<()>
where
    R: ItemWriter + ?Sized,
{
    let item_id = ItemId::new(item_id)?;
    repo.delete_item(item_id).map_err(|err| {
        log::error!("Failed to delete item {item_id}: {err}");
        ServiceError::from(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::mock::MockRepository;

    #[test]
    fn add_item_stamps_current_time() {
        let before = Utc::now().naive_utc();
        let mut repo = MockRepository::new();
        repo.expect_create_item()
            .withf(move |timestamp| *timestamp >= before)
            .returning(|timestamp| {
                Ok(Item {
                    id: ItemId::new(1).unwrap(),
                    timestamp,
                })
            });

        assert_eq!(add_item(&repo).unwrap().id.get(), 1);
    }
}
