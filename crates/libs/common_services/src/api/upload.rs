use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use std::collections::HashMap;

/// Field names accepted for the uploaded photo.
const PHOTO_FIELDS: [&str; 3] = ["file", "photo", "image"];

/// A multipart form with one photo and any number of text fields.
#[derive(Debug, Default)]
pub struct UploadedForm {
    pub photo: Option<Vec<u8>>,
    pub fields: HashMap<String, String>,
}

impl UploadedForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            if PHOTO_FIELDS.contains(&name.as_str()) {
                form.photo = Some(field.bytes().await?.to_vec());
            } else {
                form.fields.insert(name, field.text().await?);
            }
        }
        Ok(form)
    }

    /// First non-empty text field among `names`.
    #[must_use]
    pub fn field(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.fields.get(*name))
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
    }
}
