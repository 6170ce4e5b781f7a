// ============================================================================
// Groupcast Infrastructure - PostgREST Group Repository
// File: crates/groupcast-infrastructure/src/store/postgrest/group_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use reqwest::{Client, Method, Response, Url};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use groupcast_core::domain::{Group, GroupKey};
use groupcast_core::error::DomainError;
use groupcast_core::repositories::GroupRepository;
use groupcast_shared::config::StoreSettings;

use crate::store::connection::create_client;

/// Group table exposed through PostgREST (`/rest/v1/{table}`).
pub struct PostgrestGroupRepository {
    client: Client,
    endpoint: Url,
    selection_column: String,
}

// Internal row type for JSON mapping. The selection column name is configurable, so it is
// read from the remaining columns.
#[derive(Debug, Deserialize)]
struct GroupRow {
    id: GroupKey,
    group_id: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(flatten)]
    columns: Map<String, Value>,
}

impl GroupRow {
    fn into_group(self, selection_column: &str) -> Group {
        let selected = self
            .columns
            .get(selection_column)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Group::new(self.id, self.group_id, self.name.unwrap_or_default()).with_selected(selected)
    }
}

impl PostgrestGroupRepository {
    pub fn new(
        client: Client,
        base_url: &str,
        table: &str,
        selection_column: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let endpoint = Url::parse(&base)
            .and_then(|url| url.join(&format!("rest/v1/{}", table)))
            .map_err(|e| {
                DomainError::StoreError(format!("Invalid store URL {}: {}", base_url, e))
            })?;

        Ok(Self {
            client,
            endpoint,
            selection_column: selection_column.into(),
        })
    }

    pub fn from_settings(settings: &StoreSettings) -> Result<Self, DomainError> {
        let client = create_client(&settings.key, settings.timeout())?;
        let repo = Self::new(
            client,
            &settings.url,
            &settings.table,
            settings.selection_column.clone(),
        )?;
        info!("Using group store at {}", repo.endpoint);
        Ok(repo)
    }

    fn url_with(&self, filters: &[(&str, String)]) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in filters {
                query.append_pair(key, value);
            }
        }
        url
    }

    async fn patch_selection(
        &self,
        filter: (&str, String),
        selected: bool,
    ) -> Result<(), DomainError> {
        let mut body = Map::new();
        body.insert(self.selection_column.clone(), Value::Bool(selected));

        let response = self
            .client
            .request(Method::PATCH, self.url_with(&[filter]))
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::StoreError(e.to_string()))?;

        check(response).await.map(|_| ())
    }
}

async fn check(response: Response) -> Result<Response, DomainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    error!("Store returned {}: {}", status, body);
    Err(DomainError::StoreRejected {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl GroupRepository for PostgrestGroupRepository {
    async fn list(&self) -> Result<Vec<Group>, DomainError> {
        let url = self.url_with(&[("select", "*".to_string())]);
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::StoreError(e.to_string()))?;

        let rows: Vec<GroupRow> = check(response)
            .await?
            .json()
            .await
            .map_err(|e| DomainError::StoreError(format!("Failed to parse groups: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|row| row.into_group(&self.selection_column))
            .collect())
    }

    async fn update_selection(&self, id: GroupKey, selected: bool) -> Result<(), DomainError> {
        debug!("Updating group {} selection to {}", id, selected);
        self.patch_selection(("id", format!("eq.{}", id)), selected).await
    }

    async fn update_all_selections(&self, selected: bool) -> Result<(), DomainError> {
        debug!("Updating every group selection to {}", selected);
        self.patch_selection(("id", "neq.0".to_string()), selected).await
    }

    async fn delete_by_ids(&self, ids: &[GroupKey]) -> Result<(), DomainError> {
        if ids.is_empty() {
            return Ok(());
        }

        let list = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        info!("Deleting {} groups", ids.len());

        let response = self
            .client
            .delete(self.url_with(&[("id", format!("in.({})", list))]))
            .header("Prefer", "return=minimal")
            .send()
            .await
            .map_err(|e| DomainError::StoreError(e.to_string()))?;

        check(response).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn repo(server: &MockServer) -> PostgrestGroupRepository {
        let client = create_client("anon-key", None).unwrap();
        PostgrestGroupRepository::new(client, &server.uri(), "groups", "chouse").unwrap()
    }

    #[tokio::test]
    async fn test_list_maps_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/groups"))
            .and(query_param("select", "*"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": 1,
                    "group_id": -1001,
                    "name": "Ops",
                    "chouse": true,
                    "created_at": "2024-01-01"
                },
                { "id": 2, "group_id": -1002, "name": null, "chouse": false }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let groups = repo(&server).await.list().await.unwrap();
        assert_eq!(
            groups,
            vec![
                Group::new(1, -1001, "Ops").with_selected(true),
                Group::new(2, -1002, ""),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_reports_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = repo(&server).await.list().await.unwrap_err();
        assert_eq!(
            err,
            DomainError::StoreRejected {
                status: 401,
                body: "bad key".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_update_selection_patches_one_row() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/groups"))
            .and(query_param("id", "eq.7"))
            .and(body_json(json!({ "chouse": true })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        repo(&server).await.update_selection(7, true).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_all_patches_every_row() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(query_param("id", "neq.0"))
            .and(body_json(json!({ "chouse": false })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        repo(&server).await.update_all_selections(false).await.unwrap();
    }

    #[tokio::test]
    async fn test_custom_selection_column() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(body_json(json!({ "selected": true })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client("anon-key", None).unwrap();
        let repo =
            PostgrestGroupRepository::new(client, &server.uri(), "groups", "selected").unwrap();
        repo.update_selection(1, true).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_uses_in_filter() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/groups"))
            .and(query_param("id", "in.(1,2,5)"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        repo(&server).await.delete_by_ids(&[1, 2, 5]).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_delete_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(409).set_body_string("conflict"))
            .mount(&server)
            .await;

        let err = repo(&server).await.delete_by_ids(&[1]).await.unwrap_err();
        assert!(matches!(err, DomainError::StoreRejected { status: 409, .. }));
    }

    #[tokio::test]
    async fn test_empty_delete_skips_request() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        repo(&server).await.delete_by_ids(&[]).await.unwrap();
    }
}
