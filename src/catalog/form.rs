//! Form values for entity add/edit, validation and request bodies

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Number, Value};

use crate::api::ValidationError;
use crate::catalog::entity::{EntityDescriptor, FieldKind};
use crate::models::{cell_text, Record};

const CALENDAR_FORMAT: &str = "%Y-%m-%d";
const POSTER_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Raw text of every field of one entity form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues {
    values: HashMap<String, String>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Apply `key=value` assignments, rejecting keys the entity does not have
    pub fn apply_assignments(
        &mut self,
        descriptor: &EntityDescriptor,
        assignments: &[String],
    ) -> Result<(), ValidationError> {
        for assignment in assignments {
            let (key, value) = assignment.split_once('=').ok_or_else(|| {
                ValidationError::new(assignment, format!("Expected key=value, got '{}'", assignment))
            })?;
            let key = key.trim();
            let field = descriptor.field(key).ok_or_else(|| {
                let known: Vec<_> = descriptor.fields.iter().map(|f| f.key).collect();
                ValidationError::new(
                    key,
                    format!("Unknown field '{}'. Fields: {}", key, known.join(", ")),
                )
            })?;
            let value = match field.kind {
                FieldKind::File => file_name_only(value),
                _ => value.to_string(),
            };
            self.set(field.key, value);
        }
        Ok(())
    }

    /// Form state for an existing record, dates normalized for the calendar input
    pub fn from_record(descriptor: &EntityDescriptor, record: &Record) -> Self {
        let mut values = Self::new();
        for field in descriptor.fields {
            let text = record.get(field.key).map(cell_text).unwrap_or_default();
            let text = match field.kind {
                FieldKind::Date => calendar_date(&text).unwrap_or(text),
                _ => text,
            };
            values.set(field.key, text);
        }
        values
    }

    /// Check the values and build the JSON body for a create call.
    ///
    /// Required fields are checked first, in descriptor order, with file
    /// fields last; then each filled field's format.
    pub fn to_payload(&self, descriptor: &EntityDescriptor) -> Result<Value, ValidationError> {
        self.build_payload(descriptor, None)
    }

    /// Like [`to_payload`](Self::to_payload) for an update of `loaded`: a file
    /// name kept as the server returned it is not held to the upload
    /// extensions.
    pub fn to_update_payload(
        &self,
        descriptor: &EntityDescriptor,
        loaded: &FormValues,
    ) -> Result<Value, ValidationError> {
        self.build_payload(descriptor, Some(loaded))
    }

    fn build_payload(
        &self,
        descriptor: &EntityDescriptor,
        loaded: Option<&FormValues>,
    ) -> Result<Value, ValidationError> {
        let missing = |kind_filter: fn(FieldKind) -> bool| {
            descriptor
                .fields
                .iter()
                .filter(|f| f.required && kind_filter(f.kind))
                .find(|f| self.get(f.key).trim().is_empty())
        };

        if let Some(field) = missing(|kind| kind != FieldKind::File) {
            return Err(ValidationError::new(
                field.key,
                format!("Please fill out the {} field.", field.key),
            ));
        }
        if let Some(field) = missing(|kind| kind == FieldKind::File) {
            return Err(ValidationError::new(
                field.key,
                format!("Please upload a {} file.", field.key),
            ));
        }

        let mut body = Map::new();
        for field in descriptor.fields {
            let raw = self.get(field.key).trim();
            let value = match field.kind {
                _ if raw.is_empty() => Value::Null,
                FieldKind::Text => Value::String(self.get(field.key).to_string()),
                FieldKind::Number => {
                    let n: i64 = raw.parse().map_err(|_| {
                        ValidationError::new(
                            field.key,
                            format!("The {} field must be a whole number.", field.key),
                        )
                    })?;
                    Value::Number(Number::from(n))
                }
                FieldKind::Date => {
                    NaiveDate::parse_from_str(raw, CALENDAR_FORMAT).map_err(|_| {
                        ValidationError::new(
                            field.key,
                            format!("The {} field must be a date (YYYY-MM-DD).", field.key),
                        )
                    })?;
                    Value::String(raw.to_string())
                }
                FieldKind::File => {
                    let name = file_name_only(raw);
                    let unchanged = loaded.is_some_and(|l| l.get(field.key).trim() == raw);
                    if !unchanged && !has_poster_extension(&name) {
                        return Err(ValidationError::new(
                            field.key,
                            format!("The {} file must be a .jpg, .jpeg or .png image.", field.key),
                        ));
                    }
                    Value::String(name)
                }
            };
            body.insert(field.key.to_string(), value);
        }

        Ok(Value::Object(body))
    }
}

/// Reformat a wire date or date-time into `YYYY-MM-DD`.
///
/// Timestamps carrying an offset are converted to UTC before taking the date.
pub fn calendar_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, CALENDAR_FORMAT) {
        return Some(date.format(CALENDAR_FORMAT).to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive().format(CALENDAR_FORMAT).to_string());
    }

    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date().format(CALENDAR_FORMAT).to_string())
}

/// Final path component of a selected file
pub fn file_name_only(path: &str) -> String {
    path.trim()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .to_string()
}

fn has_poster_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| POSTER_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EntityKind;
    use serde_json::json;

    fn complete_film() -> FormValues {
        FormValues::new()
            .with("nom", "Le Samouraï")
            .with("description", "Jef Costello")
            .with("dateCreated", "1967")
            .with("duree", "105")
            .with("poster", "/home/me/posters/samourai.JPG")
            .with("categorieID", "2")
            .with("acteurPID", "11")
            .with("editeurID", "3")
            .with("langueID", "1")
            .with("realisateurID", "8")
    }

    #[test]
    fn test_calendar_date_formats() {
        assert_eq!(calendar_date("1980-05-12").as_deref(), Some("1980-05-12"));
        assert_eq!(calendar_date("1980-05-12T00:00:00").as_deref(), Some("1980-05-12"));
        assert_eq!(calendar_date("1980-05-12T13:45:10.123").as_deref(), Some("1980-05-12"));
        assert_eq!(calendar_date("1980-05-12T00:00:00Z").as_deref(), Some("1980-05-12"));
        assert_eq!(calendar_date("1980-05-12T23:30:00-02:00").as_deref(), Some("1980-05-13"));
        assert_eq!(calendar_date("yesterday"), None);
        assert_eq!(calendar_date(""), None);
    }

    #[test]
    fn test_file_name_only() {
        assert_eq!(file_name_only("/tmp/a/poster.png"), "poster.png");
        assert_eq!(file_name_only("C:\\Users\\x\\poster.jpg"), "poster.jpg");
        assert_eq!(file_name_only("poster.jpeg"), "poster.jpeg");
    }

    #[test]
    fn test_missing_required_field_named() {
        let film = EntityKind::Film.descriptor();
        let mut values = complete_film();
        values.set("duree", "  ");
        let err = values.to_payload(film).unwrap_err();
        assert_eq!(err.field, "duree");
        assert_eq!(err.message, "Please fill out the duree field.");
    }

    #[test]
    fn test_poster_checked_after_other_required_fields() {
        let film = EntityKind::Film.descriptor();
        let values = complete_film().with("poster", "").with("realisateurID", "");
        assert_eq!(
            values.to_payload(film).unwrap_err().message,
            "Please fill out the realisateurID field."
        );

        let values = complete_film().with("poster", "");
        assert_eq!(
            values.to_payload(film).unwrap_err().message,
            "Please upload a poster file."
        );
    }

    #[test]
    fn test_film_payload() {
        let film = EntityKind::Film.descriptor();
        let body = complete_film().to_payload(film).unwrap();
        assert_eq!(body["nom"], "Le Samouraï");
        assert_eq!(body["dateCreated"], 1967);
        assert_eq!(body["duree"], 105);
        assert_eq!(body["poster"], "samourai.JPG");
        assert_eq!(body["acteurSID"], Value::Null);
        assert_eq!(body.as_object().unwrap().len(), film.fields.len());
    }

    #[test]
    fn test_update_keeps_stored_poster_name() {
        let film = EntityKind::Film.descriptor();
        let loaded = complete_film().with("poster", "cover.webp");
        assert!(loaded.to_payload(film).is_err());

        let body = loaded
            .clone()
            .with("duree", "110")
            .to_update_payload(film, &loaded)
            .unwrap();
        assert_eq!(body["poster"], "cover.webp");
        assert_eq!(body["duree"], 110);

        let err = loaded
            .clone()
            .with("poster", "other.webp")
            .to_update_payload(film, &loaded)
            .unwrap_err();
        assert_eq!(err.field, "poster");
    }

    #[test]
    fn test_format_errors() {
        let film = EntityKind::Film.descriptor();
        let err = complete_film().with("duree", "long").to_payload(film).unwrap_err();
        assert_eq!(err.message, "The duree field must be a whole number.");

        let err = complete_film().with("poster", "poster.gif").to_payload(film).unwrap_err();
        assert_eq!(err.field, "poster");

        let actor = EntityKind::Actor.descriptor();
        let err = FormValues::new()
            .with("nom", "Delon")
            .with("prenom", "Alain")
            .with("nationalite", "French")
            .with("date_naissance", "08/11/1935")
            .to_payload(actor)
            .unwrap_err();
        assert_eq!(err.field, "date_naissance");
    }

    #[test]
    fn test_from_record_round_trips_date() {
        let editor = EntityKind::Editor.descriptor();
        let record = json!({
            "editeurID": 5,
            "nom": "Gallimard",
            "prenom": "Gaston",
            "nationalite": "French",
            "date_naissance": "1881-01-18T00:00:00"
        });
        let values = FormValues::from_record(editor, record.as_object().unwrap());
        assert_eq!(values.get("date_naissance"), "1881-01-18");

        let body = values.to_payload(editor).unwrap();
        assert_eq!(body["date_naissance"], "1881-01-18");
        assert!(body.get("editeurID").is_none());
    }

    #[test]
    fn test_apply_assignments() {
        let category = EntityKind::Category.descriptor();
        let mut values = FormValues::new();
        values
            .apply_assignments(category, &["nom=Film noir".to_string()])
            .unwrap();
        assert_eq!(values.get("nom"), "Film noir");

        let err = values
            .apply_assignments(category, &["name=x".to_string()])
            .unwrap_err();
        assert!(err.message.starts_with("Unknown field 'name'"));

        assert!(values.apply_assignments(category, &["nom".to_string()]).is_err());
    }
}
