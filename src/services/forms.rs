//! Admin form rules for product kinds.

use serde::{Deserialize, Deserializer, Serialize};

use crate::entities::{category, product_kind::ProductKind, smartphone};

const SHARED_FIELDS: [&str; 6] = ["category_id", "title", "slug", "image_id", "description", "price"];

const NOTEBOOK_FIELDS: [&str; 7] = [
    "name",
    "diagonal",
    "display_type",
    "processor_freq",
    "ram",
    "video",
    "time_without_charge",
];

const SMARTPHONE_FIELDS: [&str; 10] = [
    "name",
    "diagonal",
    "display_type",
    "resolution",
    "accum_volume",
    "ram",
    "sd",
    "sd_volume_max",
    "main_cam_mp",
    "frontal_cam_mp",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub readonly: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct AdminForm {
    pub kind: ProductKind,
    pub fields: Vec<FieldDescriptor>,
    pub category_choices: Vec<category::Model>,
}

/// Storage part of the smartphone form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmartphoneForm {
    pub sd: bool,
    pub sd_volume_max: Option<String>,
}

impl SmartphoneForm {
    /// Without a memory card slot there is no maximum card size.
    pub fn clean(mut self) -> Self {
        if !self.sd {
            self.sd_volume_max = None;
        }
        self
    }
}

/// Patch field that tells an absent key (`None`) from an explicit `null` (`Some(None)`).
/// Use with `#[serde(default, deserialize_with = "nullable")]`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Editable fields of `kind`. For an existing smartphone without a card slot,
/// `sd_volume_max` is read-only.
pub fn form_fields(kind: ProductKind, instance: Option<&smartphone::Model>) -> Vec<FieldDescriptor> {
    let specific: &[&'static str] = match kind {
        ProductKind::Notebook => &NOTEBOOK_FIELDS,
        ProductKind::Smartphone => &SMARTPHONE_FIELDS,
    };
    let storage_locked = matches!(instance, Some(phone) if !phone.sd);

    SHARED_FIELDS
        .iter()
        .chain(specific.iter())
        .map(|&name| FieldDescriptor {
            name,
            readonly: storage_locked && name == "sd_volume_max",
        })
        .collect()
}
