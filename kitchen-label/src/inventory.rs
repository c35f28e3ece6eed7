//! Inventory records keyed by label id, and the store seam the app saves them through.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::caption::CaptionInputs;
use crate::id::LabelId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("label {0} already exists")]
    Duplicate(LabelId),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// What the label form collects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelForm {
    pub product: String,
    pub preparer_name: String,
    pub prepared_date: String,
    pub expiry_date: String,
    pub container_type: String,
}

impl LabelForm {
    pub fn caption_inputs(&self) -> CaptionInputs {
        CaptionInputs::new(&self.product, &self.preparer_name, &self.prepared_date, &self.expiry_date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub id: LabelId,
    pub product: String,
    pub preparer_name: String,
    pub prepared_date: String,
    pub expiry_date: String,
    pub container_type: String,
    pub created_at: DateTime<Utc>,
}

impl LabelRecord {
    pub fn from_form(id: LabelId, form: LabelForm, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            product: form.product,
            preparer_name: form.preparer_name,
            prepared_date: form.prepared_date,
            expiry_date: form.expiry_date,
            container_type: form.container_type,
            created_at,
        }
    }
}

pub trait InventoryStore: Send + Sync {
    fn save(&self, record: LabelRecord) -> Result<LabelRecord, StoreError>;
    fn get_by_id(&self, id: &LabelId) -> Result<Option<LabelRecord>, StoreError>;
}

/// In-process store; the id is the primary key.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<LabelId, LabelRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InventoryStore for MemoryStore {
    fn save(&self, record: LabelRecord) -> Result<LabelRecord, StoreError> {
        let mut records = self.records.write().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        if records.contains_key(&record.id) {
            return Err(StoreError::Duplicate(record.id));
        }
        debug!(id = %record.id, "label saved");
        records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn get_by_id(&self, id: &LabelId) -> Result<Option<LabelRecord>, StoreError> {
        let records = self.records.read().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(records.get(id).cloned())
    }
}
