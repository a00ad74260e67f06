//! Descriptor-driven CRUD calls shared by the TUI screens and the CLI

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::catalog::entity::EntityDescriptor;
use crate::models::{Record, RecordId};

/// Every record of the entity
pub async fn fetch_all(
    api: &ApiClient,
    descriptor: &EntityDescriptor,
) -> Result<Vec<Record>, ApiError> {
    let records = api.read_collection(descriptor.resource).await?;
    debug!("Fetched {} {}", records.len(), descriptor.title);
    Ok(records)
}

pub async fn fetch_one(
    api: &ApiClient,
    descriptor: &EntityDescriptor,
    id: RecordId,
) -> Result<Record, ApiError> {
    api.read_one(descriptor.resource, id).await
}

/// Create a record; anything but 201 counts as failure
pub async fn create(
    api: &ApiClient,
    descriptor: &EntityDescriptor,
    payload: &Value,
) -> Result<(), ApiError> {
    let response = api.create(descriptor.resource, payload).await?;
    expect_status(response.status, EntityDescriptor::CREATE_SUCCESS)?;
    info!("Created {} via {}", descriptor.singular, descriptor.resource);
    Ok(())
}

/// Replace a record; anything but 200 counts as failure
pub async fn update(
    api: &ApiClient,
    descriptor: &EntityDescriptor,
    id: RecordId,
    payload: &Value,
) -> Result<(), ApiError> {
    let response = api.update(descriptor.resource, id, payload).await?;
    expect_status(response.status, EntityDescriptor::UPDATE_SUCCESS)?;
    info!("Updated {} {}", descriptor.singular, id);
    Ok(())
}

/// Delete a record.
///
/// Returns `true` only when the server answered with the entity's own
/// delete-success status; other 2xx answers leave the caller's state alone.
pub async fn delete(
    api: &ApiClient,
    descriptor: &EntityDescriptor,
    id: RecordId,
) -> Result<bool, ApiError> {
    let response = api.delete(descriptor.resource, id).await?;
    if response.status == descriptor.delete_success {
        info!("Deleted {} {}", descriptor.singular, id);
        Ok(true)
    } else {
        warn!(
            "Delete of {} {} answered {} (expected {})",
            descriptor.singular, id, response.status, descriptor.delete_success
        );
        Ok(false)
    }
}

fn expect_status(actual: u16, expected: u16) -> Result<(), ApiError> {
    if actual == expected {
        Ok(())
    } else {
        Err(ApiError::UnexpectedStatus { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use crate::catalog::EntityKind;
    use reqwest::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_film_delete_needs_204() {
        let film = EntityKind::Film.descriptor();

        let mock = MockTransport::new().respond_empty("DELETE Film/3", 204);
        assert!(delete(&mock.client(), film, 3).await.unwrap());

        let mock = MockTransport::new().respond_empty("DELETE Film/3", 200);
        assert!(!delete(&mock.client(), film, 3).await.unwrap());
    }

    #[tokio::test]
    async fn test_category_delete_needs_200() {
        let category = EntityKind::Category.descriptor();

        let mock = MockTransport::new().respond_empty("DELETE Categories/8", 200);
        assert!(delete(&mock.client(), category, 8).await.unwrap());

        let mock = MockTransport::new().respond_empty("DELETE Categories/8", 204);
        assert!(!delete(&mock.client(), category, 8).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_requires_201() {
        let language = EntityKind::Language.descriptor();
        let body = json!({"langues": "Breton"});

        let mock = MockTransport::new().respond("POST langues", 201, json!({"languesID": 9}));
        create(&mock.client(), language, &body).await.unwrap();
        assert_eq!(mock.requests()[0].body.as_ref(), Some(&body));

        let mock = MockTransport::new().respond("POST langues", 200, json!({}));
        let err = create(&mock.client(), language, &body).await.unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedStatus { expected: 201, actual: 200 }));
    }

    #[tokio::test]
    async fn test_update_puts_to_item_path() {
        let editor = EntityKind::Editor.descriptor();
        let mock = MockTransport::new().respond_empty("PUT Editeurs/4", 200);
        update(&mock.client(), editor, 4, &json!({"nom": "Actes Sud"}))
            .await
            .unwrap();
        assert_eq!(mock.count(Method::PUT), 1);
        assert_eq!(mock.requests()[0].path, "Editeurs/4");
    }
}
