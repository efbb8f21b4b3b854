//! Signup trigger: materializes a provider record for each new
//! identity-service user. Event delivery belongs to the host runtime; this
//! module is only the handler it invokes.

use chrono::Utc;

use crate::models::Provider;
use crate::store::{self, DocumentStore, StoreError};

/// New-user event as delivered by the identity service.
#[derive(Debug, Clone)]
pub struct NewUserEvent {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Create the provider record for a newly signed-up user, keyed by the
/// subject id. A record that already exists at the key is left untouched,
/// so a replayed signup event cannot clobber profile edits. Write failures
/// propagate to the host runtime for its own retry policy.
pub async fn provision_provider(
    store: &dyn DocumentStore,
    event: &NewUserEvent,
) -> Result<(), StoreError> {
    let doc_ref = store::provider_doc(&event.uid);

    if store.get(&doc_ref).await?.is_some() {
        tracing::info!("provider record already exists for user {}", event.uid);
        return Ok(());
    }

    let now = Utc::now();
    let short_uid: String = event.uid.chars().take(8).collect();
    let provider = Provider {
        email: event
            .email
            .clone()
            .unwrap_or_else(|| format!("provider-{}@patientpilot.com", event.uid)),
        name: event
            .display_name
            .clone()
            .unwrap_or_else(|| format!("Provider {short_uid}")),
        contact_info: None,
        profile_image_url: None,
        created_at: now,
        updated_at: now,
    };

    store.set(&doc_ref, store::document_from(&provider)?).await?;
    tracing::info!("provider record created for user {}", event.uid);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn event(uid: &str) -> NewUserEvent {
        NewUserEvent {
            uid: uid.to_string(),
            email: None,
            display_name: None,
        }
    }

    #[tokio::test]
    async fn creates_record_with_placeholder_fallbacks() {
        let store = MemoryStore::new();
        provision_provider(&store, &event("abcdef1234567890"))
            .await
            .unwrap();

        let doc = store
            .get(&store::provider_doc("abcdef1234567890"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            doc.get("email"),
            Some(&json!("provider-abcdef1234567890@patientpilot.com"))
        );
        assert_eq!(doc.get("name"), Some(&json!("Provider abcdef12")));
        assert_eq!(doc.get("profileImageUrl"), Some(&json!(null)));
        assert_eq!(doc.get("createdAt"), doc.get("updatedAt"));
    }

    #[tokio::test]
    async fn uses_event_email_and_name_when_present() {
        let store = MemoryStore::new();
        provision_provider(
            &store,
            &NewUserEvent {
                uid: "u1".into(),
                email: Some("dr.kim@clinic.org".into()),
                display_name: Some("Dr. Kim".into()),
            },
        )
        .await
        .unwrap();

        let doc = store
            .get(&store::provider_doc("u1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.get("email"), Some(&json!("dr.kim@clinic.org")));
        assert_eq!(doc.get("name"), Some(&json!("Dr. Kim")));
    }

    #[tokio::test]
    async fn replayed_event_preserves_existing_record() {
        let store = MemoryStore::new();
        provision_provider(&store, &event("u1")).await.unwrap();

        // Simulate a later profile edit
        let mut edited = store::Document::new();
        edited.insert("name".into(), json!("Dr. Edited"));
        store
            .merge(&store::provider_doc("u1"), edited)
            .await
            .unwrap();

        provision_provider(&store, &event("u1")).await.unwrap();

        let doc = store
            .get(&store::provider_doc("u1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.get("name"), Some(&json!("Dr. Edited")));
    }
}
