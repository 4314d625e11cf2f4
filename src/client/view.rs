use crate::entities::media::MediaKind;
use crate::models::media::MediaRecord;

use super::{CatalogBackend, ClientError, PreparedFile, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum KindFilter {
    #[default]
    All,
    Image,
    Video,
}

impl KindFilter {
    pub fn admits(self, kind: MediaKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Image => kind == MediaKind::Image,
            KindFilter::Video => kind == MediaKind::Video,
        }
    }
}

/// True when the record passes the kind filter and the search term (case-insensitive) occurs in
/// its label or its stored name. An empty term matches everything.
pub fn matches(record: &MediaRecord, search: &str, kind: KindFilter) -> bool {
    if !kind.admits(record.file_type) {
        return false;
    }

    let search = search.to_lowercase();
    let label = record.file_label.as_deref().unwrap_or_default().to_lowercase();
    let name = record.file_name.to_lowercase();

    label.contains(&search) || name.contains(&search)
}

pub fn filter_records<'a>(
    records: &'a [MediaRecord],
    search: &str,
    kind: KindFilter,
) -> Vec<&'a MediaRecord> {
    records
        .iter()
        .filter(|record| matches(record, search, kind))
        .collect()
}

/// Asks the user before something destructive happens.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(String),
    Declined,
}

/// Local, disposable copy of the catalog plus the current search and kind filter.
///
/// Mutations go to the backend and are followed by a full refresh; the cache is never patched
/// speculatively.
pub struct CatalogView<B> {
    backend: B,
    cache: Vec<MediaRecord>,
    search: String,
    kind: KindFilter,
    visible: Option<Vec<usize>>,
    // Times `visible` was recomputed.
    filter_runs: usize,
}

impl<B: CatalogBackend> CatalogView<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            cache: Vec::new(),
            search: String::new(),
            kind: KindFilter::All,
            visible: None,
            filter_runs: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn records(&self) -> &[MediaRecord] {
        &self.cache
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn kind(&self) -> KindFilter {
        self.kind
    }

    /// Replaces the cache with the server's list. Unreachable servers and malformed payloads
    /// leave an empty cache. Returns the number of cached records.
    pub async fn refresh(&mut self, session: &Session) -> usize {
        let records = match self.backend.list(session).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "could not load the catalog, showing an empty list");
                Vec::new()
            }
        };

        self.cache = records;
        self.visible = None;
        self.cache.len()
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        if search != self.search {
            self.search = search;
            self.visible = None;
        }
    }

    pub fn set_kind(&mut self, kind: KindFilter) {
        if kind != self.kind {
            self.kind = kind;
            self.visible = None;
        }
    }

    /// Records passing the current search and kind filter, in cache order. The subset is only
    /// recomputed after the cache, the search term or the kind filter changed.
    pub fn visible(&mut self) -> Vec<&MediaRecord> {
        let cache = &self.cache;
        let search = self.search.as_str();
        let kind = self.kind;
        let runs = &mut self.filter_runs;

        let indices = self.visible.get_or_insert_with(|| {
            *runs += 1;
            cache
                .iter()
                .enumerate()
                .filter(|(_, record)| matches(record, search, kind))
                .map(|(i, _)| i)
                .collect()
        });

        indices.iter().map(|&i| &cache[i]).collect()
    }

    #[cfg(test)]
    fn filter_runs(&self) -> usize {
        self.filter_runs
    }

    pub async fn request_upload(
        &mut self,
        session: &Session,
        label: &str,
        file: PreparedFile,
    ) -> Result<String, ClientError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(ClientError::Validation("A title is required".to_string()));
        }

        let message = self.backend.upload(session, label, file).await?;
        self.refresh(session).await;
        Ok(message)
    }

    pub async fn request_edit(
        &mut self,
        session: &Session,
        id: i32,
        label: &str,
        file: Option<PreparedFile>,
    ) -> Result<String, ClientError> {
        let message = self.backend.edit(session, id, label, file).await?;
        self.refresh(session).await;
        Ok(message)
    }

    /// Deletes after the user confirms; nothing is sent when they decline.
    pub async fn request_delete(
        &mut self,
        session: &Session,
        id: i32,
        confirm: &mut impl Confirm,
    ) -> Result<DeleteOutcome, ClientError> {
        let title = self
            .cache
            .iter()
            .find(|record| record.id == id)
            .map(|record| record.title().to_string())
            .unwrap_or_else(|| format!("#{}", id));

        if !confirm.confirm(&format!("Delete \"{}\"? This cannot be undone.", title)) {
            return Ok(DeleteOutcome::Declined);
        }

        let message = self.backend.delete(session, id).await?;
        self.refresh(session).await;
        Ok(DeleteOutcome::Deleted(message))
    }
}
