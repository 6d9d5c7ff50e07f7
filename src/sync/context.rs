//! Explicit state shared by every task of one import or export

use crate::client::ProjectApi;
use std::sync::Arc;

/// What happens when the service rejects an upload for a reason other than
/// the file already existing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// The failure fails the whole import
    #[default]
    Strict,
    /// The failure is logged and the file counts as done
    BestEffort,
}

/// Upload route a local file takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    /// Scripts and any other file, sent as text in a JSON body
    Text,
    /// `.jpg` and `.png` files, sent through the multipart endpoint
    Media,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Replace files that already exist in the project
    pub overwrite: bool,
    pub text_policy: ErrorPolicy,
    pub media_policy: ErrorPolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            text_policy: ErrorPolicy::Strict,
            media_policy: ErrorPolicy::BestEffort,
        }
    }
}

impl SyncOptions {
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_policy(mut self, class: FileClass, policy: ErrorPolicy) -> Self {
        match class {
            FileClass::Text => self.text_policy = policy,
            FileClass::Media => self.media_policy = policy,
        }
        self
    }

    pub fn policy_for(&self, class: FileClass) -> ErrorPolicy {
        match class {
            FileClass::Text => self.text_policy,
            FileClass::Media => self.media_policy,
        }
    }
}

/// Client and options handed to every sync task.
///
/// Cloning shares the client.
pub struct SyncContext<C> {
    client: Arc<C>,
    options: SyncOptions,
}

impl<C: ProjectApi> SyncContext<C> {
    pub fn new(client: C) -> Self {
        Self::from_arc(Arc::new(client))
    }

    pub fn from_arc(client: Arc<C>) -> Self {
        Self {
            client,
            options: SyncOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }
}

impl<C> Clone for SyncContext<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            options: self.options.clone(),
        }
    }
}
