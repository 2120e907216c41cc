use crate::libs::core::garden_store::{now, GardenStore};
use crate::libs::core::models::{PlantId, UserId};
use crate::libs::storage::database::storage_traits::{PlantStore, StoreError, UserStore};
use crate::libs::storage::records::{PlantDraft, PlantRecord};
use tracing::{debug, info};

impl GardenStore {
    pub fn add_plant(&self, owner: &UserId, draft: PlantDraft) -> Result<PlantRecord, StoreError> {
        let draft = normalise(draft)?;

        let plant = self.database.with_transaction(|tx| {
            if tx.load_user_by_id(owner)?.is_none() {
                return Err(StoreError::UnknownUser(owner.to_string()));
            }
            let plant = PlantRecord::new(owner, draft, now());
            tx.insert_plant(&plant)?;
            Ok(plant)
        })?;

        info!("Added plant {:?} ({}) for {}", plant.name, plant.plant_id, owner);
        Ok(plant)
    }

    pub fn update_plant(
        &self,
        owner: &UserId,
        plant_id: &PlantId,
        draft: PlantDraft,
    ) -> Result<PlantRecord, StoreError> {
        let draft = normalise(draft)?;

        self.database.with_transaction(|tx| {
            let mut plant = tx
                .load_plant(owner, plant_id)?
                .ok_or(StoreError::NotFound("plant"))?;
            plant.apply(draft, now());
            tx.update_plant(&plant)?;
            Ok(plant)
        })
    }

    pub fn delete_plant(&self, owner: &UserId, plant_id: &PlantId) -> Result<(), StoreError> {
        let deleted = self
            .database
            .with_transaction(|tx| tx.delete_plant(owner, plant_id))?;
        if deleted == 0 {
            return Err(StoreError::NotFound("plant"));
        }
        info!("Deleted plant {} for {}", plant_id, owner);
        Ok(())
    }

    pub fn set_archived(
        &self,
        owner: &UserId,
        plant_id: &PlantId,
        archived: bool,
    ) -> Result<(), StoreError> {
        let updated = self
            .database
            .with_transaction(|tx| tx.set_plant_archived(owner, plant_id, archived, now()))?;
        if updated == 0 {
            return Err(StoreError::NotFound("plant"));
        }
        Ok(())
    }

    pub fn load_plant(
        &self,
        owner: &UserId,
        plant_id: &PlantId,
    ) -> Result<PlantRecord, StoreError> {
        self.database.with_read_transaction(|tx| {
            tx.load_plant(owner, plant_id)?
                .ok_or(StoreError::NotFound("plant"))
        })
    }

    /// Newest first.
    pub fn list_plants(
        &self,
        owner: &UserId,
        archived: bool,
    ) -> Result<Vec<PlantRecord>, StoreError> {
        let plants = self
            .database
            .with_read_transaction(|tx| tx.load_plants(owner, archived))?;
        debug!("Loaded {} plants for {} (archived: {})", plants.len(), owner, archived);
        Ok(plants)
    }
}

fn normalise(draft: PlantDraft) -> Result<PlantDraft, StoreError> {
    let name = draft.name.trim().to_string();
    if name.is_empty() {
        return Err(StoreError::InvalidInput("A plant needs a name".to_string()));
    }
    Ok(PlantDraft {
        name,
        age: draft.age.trim().to_string(),
        shade: draft.shade,
        notes: draft.notes.trim_end().to_string(),
        photo: draft.photo.filter(|path| !path.trim().is_empty()),
    })
}
