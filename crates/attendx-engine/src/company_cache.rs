//! Company-name lookup scoped to one restore run

use attendx_core::errors::{ExError, ExErrorKind};
use attendx_core::model::Company;
use attendx_store::errors::Result;
use attendx_store::SqliteRepo;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::collections::HashMap;

/// Maps company names to store companies, creating missing ones on demand.
///
/// Built fresh for every restore and dropped with it; nothing is shared
/// between runs.
#[derive(Debug, Default)]
pub struct CompanyCache {
    by_name: HashMap<String, Company>,
    created: Vec<String>,
}

impl CompanyCache {
    /// Load every existing company
    pub fn load(conn: &Connection) -> Result<Self> {
        let by_name = SqliteRepo::list_companies(conn)?
            .into_iter()
            .map(|c| (c.name.clone(), c))
            .collect();
        Ok(Self {
            by_name,
            created: Vec::new(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&Company> {
        self.by_name.get(name)
    }

    /// Return the company called `name`, creating it first if the store
    /// does not have it
    pub fn resolve_or_create(
        &mut self,
        conn: &Connection,
        name: &str,
        at: DateTime<Utc>,
    ) -> Result<&Company> {
        if !self.by_name.contains_key(name) {
            let company = SqliteRepo::create_company(conn, name, at)?;
            tracing::debug!(company_name = name, company_id = company.id, "Created company");
            self.created.push(name.to_string());
            self.by_name.insert(name.to_string(), company);
        }

        self.by_name.get(name).ok_or_else(|| {
            ExError::new(ExErrorKind::Internal)
                .with_op("resolve_company")
                .with_entity_id(name)
                .with_message("Company missing from cache after insert")
        })
    }

    /// Names of companies created through this cache, in creation order
    pub fn created(&self) -> &[String] {
        &self.created
    }
}
