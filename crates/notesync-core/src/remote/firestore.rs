//! Firestore REST client for the note collections.
//!
//! Layout per user:
//! - `notes/{user}/notes/{id}` holds live notes
//! - `deletes/{user}/notes/{id}` holds tombstones

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::FirestoreConfig;
use crate::data::{check_batch_size, NoteNetworkStore, MAX_BATCH_SIZE};
use crate::error::{Error, Result};
use crate::models::{Note, NoteId};
use crate::util::{compact_text, millis_to_rfc3339, rfc3339_to_millis};

const LIST_PAGE_SIZE: &str = "300";
const UPDATED_AT_FIELD: &str = "updated_at";
const REQUEST_TIME: &str = "REQUEST_TIME";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Notes,
    Deletes,
}

impl Collection {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Notes => "notes",
            Self::Deletes => "deletes",
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StringValue {
    #[serde(default)]
    string_value: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimestampValue {
    #[serde(default)]
    timestamp_value: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct NoteFields {
    id: StringValue,
    title: StringValue,
    body: StringValue,
    created_at: TimestampValue,
    updated_at: TimestampValue,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    fields: NoteFields,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldTransform {
    field_path: &'static str,
    set_to_server_value: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Write {
    #[serde(skip_serializing_if = "Option::is_none")]
    update: Option<Document>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delete: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    update_transforms: Vec<FieldTransform>,
}

#[derive(Debug, Serialize)]
struct CommitRequest {
    writes: Vec<Write>,
}

impl Document {
    fn from_note(name: String, note: &Note) -> Self {
        Self {
            name: Some(name),
            fields: NoteFields {
                id: StringValue {
                    string_value: note.id.to_string(),
                },
                title: StringValue {
                    string_value: note.title.clone(),
                },
                body: StringValue {
                    string_value: note.body.clone(),
                },
                created_at: TimestampValue {
                    timestamp_value: millis_to_rfc3339(note.created_at),
                },
                updated_at: TimestampValue {
                    timestamp_value: millis_to_rfc3339(note.updated_at),
                },
            },
        }
    }

    fn into_note(self) -> Result<Note> {
        let id = if self.fields.id.string_value.is_empty() {
            self.name
                .as_deref()
                .and_then(|name| name.rsplit('/').next())
                .unwrap_or_default()
                .to_string()
        } else {
            self.fields.id.string_value
        };
        let id: NoteId = id.parse()?;

        let parse_time = |field: &str, value: &TimestampValue| {
            rfc3339_to_millis(&value.timestamp_value).ok_or_else(|| {
                Error::InvalidInput(format!(
                    "note {id} has an invalid {field} timestamp '{}'",
                    value.timestamp_value
                ))
            })
        };
        let created_at = parse_time("created_at", &self.fields.created_at)?;
        let updated_at = parse_time("updated_at", &self.fields.updated_at)?;

        Ok(Note {
            id,
            title: self.fields.title.string_value,
            body: self.fields.body.string_value,
            created_at,
            updated_at,
        })
    }
}

/// Network store over the Firestore REST API.
#[derive(Debug, Clone)]
pub struct FirestoreNoteNetwork {
    client: reqwest::Client,
    config: FirestoreConfig,
}

impl FirestoreNoteNetwork {
    pub fn new(config: FirestoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Resource name of the database's document root.
    fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/(default)/documents",
            self.config.project_id
        )
    }

    fn collection_path(&self, collection: Collection) -> String {
        format!(
            "{}/{}/{}/notes",
            self.documents_root(),
            collection.as_str(),
            self.config.user_id
        )
    }

    fn document_name(&self, collection: Collection, id: &NoteId) -> String {
        format!("{}/{}", self.collection_path(collection), id)
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/v1/{resource}", self.config.base_url.trim_end_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn upsert(&self, collection: Collection, note: &Note) -> Write {
        let update_transforms = match collection {
            Collection::Notes => vec![FieldTransform {
                field_path: UPDATED_AT_FIELD,
                set_to_server_value: REQUEST_TIME,
            }],
            Collection::Deletes => Vec::new(),
        };
        Write {
            update: Some(Document::from_note(
                self.document_name(collection, &note.id),
                note,
            )),
            delete: None,
            update_transforms,
        }
    }

    fn removal(&self, collection: Collection, id: &NoteId) -> Write {
        Write {
            update: None,
            delete: Some(self.document_name(collection, id)),
            update_transforms: Vec::new(),
        }
    }

    /// Apply `writes` as one atomic commit.
    async fn commit(&self, writes: Vec<Write>) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }
        let count = writes.len();
        let url = self.url(&format!("{}:commit", self.documents_root()));
        let response = self
            .authorize(self.client.post(&url))
            .header("Accept", "application/json")
            .json(&CommitRequest { writes })
            .send()
            .await?;
        check_status(response).await?;
        tracing::debug!(writes = count, "committed firestore batch");
        Ok(())
    }

    async fn fetch(&self, collection: Collection, id: &NoteId) -> Result<Option<Note>> {
        let url = self.url(&self.document_name(collection, id));
        let response = self
            .authorize(self.client.get(&url))
            .header("Accept", "application/json")
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let document = check_status(response).await?.json::<Document>().await?;
        document.into_note().map(Some)
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Note>> {
        let base = self.url(&self.collection_path(collection));
        let mut notes = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = Url::parse(&base)
                .map_err(|error| Error::InvalidInput(format!("invalid store url: {error}")))?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", LIST_PAGE_SIZE);
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let response = self
                .authorize(self.client.get(url))
                .header("Accept", "application/json")
                .send()
                .await?;
            let page = check_status(response).await?.json::<ListResponse>().await?;
            for document in page.documents {
                notes.push(document.into_note()?);
            }

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(notes)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(Error::Remote {
        status,
        message: compact_text(&body),
    })
}

#[async_trait]
impl NoteNetworkStore for FirestoreNoteNetwork {
    async fn insert_or_update_note(&self, note: &Note) -> Result<()> {
        self.commit(vec![self.upsert(Collection::Notes, note)]).await
    }

    async fn insert_or_update_notes(&self, notes: &[Note]) -> Result<()> {
        check_batch_size(notes.len())?;
        let writes = notes
            .iter()
            .map(|note| self.upsert(Collection::Notes, note))
            .collect();
        self.commit(writes).await
    }

    async fn delete_note(&self, id: &NoteId) -> Result<()> {
        self.commit(vec![self.removal(Collection::Notes, id)]).await
    }

    async fn insert_deleted_note(&self, note: &Note) -> Result<()> {
        self.commit(vec![self.upsert(Collection::Deletes, note)])
            .await
    }

    async fn insert_deleted_notes(&self, notes: &[Note]) -> Result<()> {
        check_batch_size(notes.len())?;
        let writes = notes
            .iter()
            .map(|note| self.upsert(Collection::Deletes, note))
            .collect();
        self.commit(writes).await
    }

    async fn delete_deleted_note(&self, note: &Note) -> Result<()> {
        self.commit(vec![self.removal(Collection::Deletes, &note.id)])
            .await
    }

    async fn get_deleted_notes(&self) -> Result<Vec<Note>> {
        self.list(Collection::Deletes).await
    }

    async fn delete_all_notes(&self) -> Result<()> {
        for collection in [Collection::Deletes, Collection::Notes] {
            let ids: Vec<NoteId> = self
                .list(collection)
                .await?
                .into_iter()
                .map(|note| note.id)
                .collect();
            for chunk in ids.chunks(MAX_BATCH_SIZE) {
                let writes = chunk
                    .iter()
                    .map(|id| self.removal(collection, id))
                    .collect();
                self.commit(writes).await?;
            }
            tracing::info!(
                collection = collection.as_str(),
                removed = ids.len(),
                "cleared remote collection"
            );
        }
        Ok(())
    }

    async fn search_note(&self, note: &Note) -> Result<Option<Note>> {
        self.fetch(Collection::Notes, &note.id).await
    }

    async fn get_all_notes(&self) -> Result<Vec<Note>> {
        self.list(Collection::Notes).await
    }
}
