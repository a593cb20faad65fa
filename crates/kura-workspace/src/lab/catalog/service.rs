use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::domain::{
    normalize_service_code, CatalogQuery, LabService, NewOffering, NewService, Offering,
    ServiceId, ServiceType,
};
use crate::lab::format::matches_query;
use crate::lab::repository::{CatalogRepository, RepositoryError};

pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const MAX_SEARCH_LIMIT: usize = 100;

/// Catalog operations behind the catalog list and create pages.
pub struct CatalogService<R> {
    repository: Arc<R>,
}

impl<R> CatalogService<R>
where
    R: CatalogRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn create_service(&self, draft: NewService) -> Result<LabService, CatalogError> {
        let code = normalize_service_code(&draft.code).ok_or_else(|| {
            CatalogError::Validation(format!(
                "code '{}' must look like LAB-001 (2-6 letters, dash, 3+ digits)",
                draft.code.trim()
            ))
        })?;
        let name = required(&draft.name, "name")?;
        let category = required(&draft.category, "category")?;
        let base_price = non_negative(draft.base_price, "basePrice")?;
        let description = draft
            .description
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        self.check_children(draft.service_type, &draft.child_service_ids)?;

        let service = LabService {
            id: ServiceId(format!("svc-{}", Uuid::new_v4())),
            code,
            name,
            description,
            category,
            base_price,
            service_type: draft.service_type,
            is_custom: draft.is_custom,
            child_service_ids: draft.child_service_ids,
        };

        let stored = self.repository.insert_service(service).map_err(|err| match err {
            RepositoryError::Conflict => CatalogError::Conflict(draft.code.trim().to_uppercase()),
            other => CatalogError::Repository(other),
        })?;

        info!(code = %stored.code, service_type = ?stored.service_type, "catalog service created");
        Ok(stored)
    }

    fn check_children(
        &self,
        service_type: ServiceType,
        children: &[ServiceId],
    ) -> Result<(), CatalogError> {
        match service_type {
            ServiceType::Single if !children.is_empty() => Err(CatalogError::Validation(
                "single services cannot list child services".to_string(),
            )),
            ServiceType::Single => Ok(()),
            ServiceType::Bundle if children.is_empty() => Err(CatalogError::Validation(
                "bundles must include at least one child service".to_string(),
            )),
            ServiceType::Bundle => {
                let mut seen = HashSet::new();
                for child_id in children {
                    if !seen.insert(child_id) {
                        return Err(CatalogError::Validation(format!(
                            "child service {child_id} is listed more than once"
                        )));
                    }
                    let child = self.repository.service_by_id(child_id)?.ok_or_else(|| {
                        CatalogError::Validation(format!("child service {child_id} does not exist"))
                    })?;
                    if child.service_type != ServiceType::Single {
                        return Err(CatalogError::Validation(format!(
                            "child service {child_id} is a bundle; bundles can only hold single services"
                        )));
                    }
                }
                Ok(())
            }
        }
    }

    pub fn get_service(&self, code: &str) -> Result<LabService, CatalogError> {
        let wanted = code.trim().to_ascii_uppercase();
        self.repository
            .service_by_code(&wanted)?
            .ok_or(CatalogError::NotFound(wanted))
    }

    /// Substring search across name, code, and category.
    pub fn search_services(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<LabService>, CatalogError> {
        self.list_services(&CatalogQuery {
            q: Some(query.to_string()),
            service_type: None,
            limit: Some(limit.unwrap_or(DEFAULT_SEARCH_LIMIT)),
        })
    }

    pub fn services_by_type(
        &self,
        service_type: ServiceType,
    ) -> Result<Vec<LabService>, CatalogError> {
        self.list_services(&CatalogQuery {
            q: None,
            service_type: Some(service_type),
            limit: None,
        })
    }

    /// Applies the query and type filters together, ordered by code.
    pub fn list_services(&self, query: &CatalogQuery) -> Result<Vec<LabService>, CatalogError> {
        let text = query.q.as_deref().unwrap_or_default();
        let mut services: Vec<LabService> = self
            .repository
            .services()?
            .into_iter()
            .filter(|service| {
                query
                    .service_type
                    .map_or(true, |wanted| service.service_type == wanted)
            })
            .filter(|service| {
                matches_query(text, &[&service.name, &service.code, &service.category])
            })
            .collect();

        services.sort_by(|a, b| a.code.cmp(&b.code));
        if let Some(limit) = query.limit {
            services.truncate(limit.min(MAX_SEARCH_LIMIT));
        }
        Ok(services)
    }

    pub fn create_offering(&self, draft: NewOffering) -> Result<Offering, CatalogError> {
        let pos_id = required(&draft.pos_id, "posId")?;
        let price = non_negative(draft.price, "price")?;
        if self.repository.service_by_id(&draft.service_id)?.is_none() {
            return Err(CatalogError::NotFound(draft.service_id.0));
        }

        let offering = Offering {
            id: format!("off-{}", Uuid::new_v4()),
            service_id: draft.service_id,
            pos_id,
            price,
            enabled: draft.enabled,
        };
        let stored = self.repository.insert_offering(offering)?;
        info!(service_id = %stored.service_id, pos_id = %stored.pos_id, "offering created");
        Ok(stored)
    }

    pub fn offerings_for(&self, code: &str) -> Result<Vec<Offering>, CatalogError> {
        let service = self.get_service(code)?;
        Ok(self.repository.offerings_for(&service.id)?)
    }

    /// Number of services listed in the catalog.
    pub fn active_count(&self) -> Result<usize, CatalogError> {
        Ok(self.repository.services()?.len())
    }
}

fn required(value: &str, field: &str) -> Result<String, CatalogError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CatalogError::Validation(format!("{field} is required")))
    } else {
        Ok(trimmed.to_string())
    }
}

fn non_negative(value: i64, field: &str) -> Result<u64, CatalogError> {
    u64::try_from(value)
        .map_err(|_| CatalogError::Validation(format!("{field} must be zero or greater")))
}

/// Error raised by the catalog service.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),
    #[error("service code {0} already exists")]
    Conflict(String),
    #[error("service {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
