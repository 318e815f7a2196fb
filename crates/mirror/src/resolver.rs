//! Resolve remote references to local mirror paths

use crate::local::{ensure_parent, set_modified, LocalFile};
use crate::store::{ObjectMeta, RemoteStore};
use crate::{
    DownloadMode, InvalidReason, MirrorError, MirrorRoot, RemoteFailure, RemoteReference, Result,
};
use std::path::{Path, PathBuf};

/// Manifest object names looked up under a dataset prefix, in order
pub const MANIFEST_FILENAMES: [&str; 2] = ["lecida__manifest.yml", "manifest.yml"];

/// Options controlling a single resolve
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub mode: DownloadMode,
    include: Vec<glob::Pattern>,
}

impl ResolveOptions {
    pub fn new(mode: DownloadMode) -> Self {
        Self {
            mode,
            include: Vec::new(),
        }
    }

    /// Restrict prefix syncs to objects whose key (relative to the prefix)
    /// matches at least one of these glob patterns
    pub fn with_include_patterns<I, S>(mut self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let compiled = glob::Pattern::new(pattern).map_err(|e| {
                MirrorError::InvalidOption(format!("invalid include pattern '{pattern}': {e}"))
            })?;
            self.include.push(compiled);
        }
        Ok(self)
    }

    fn includes(&self, relative_key: &str) -> bool {
        self.include.is_empty() || self.include.iter().any(|p| p.matches(relative_key))
    }
}

/// Keeps local copies of remote objects under a mirror root
pub struct MirrorResolver<S> {
    root: MirrorRoot,
    store: S,
}

impl<S: RemoteStore> MirrorResolver<S> {
    pub fn new(root: MirrorRoot, store: S) -> Self {
        Self { root, store }
    }

    pub fn root(&self) -> &MirrorRoot {
        &self.root
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Local mirror path for a reference, without touching the filesystem or network
    pub fn local_path(&self, reference: &RemoteReference) -> PathBuf {
        reference.local_path(self.root.path())
    }

    /// Ensure a local copy of `uri` exists and return its path
    ///
    /// Malformed references are rejected before any filesystem or network access.
    pub async fn resolve(&self, uri: &str, options: &ResolveOptions) -> Result<PathBuf> {
        let reference = RemoteReference::parse(uri)?;
        self.resolve_reference(&reference, options).await
    }

    /// Like `resolve`, but plain local paths are returned unchanged
    pub async fn resolve_path(&self, path: &str, options: &ResolveOptions) -> Result<PathBuf> {
        match local_passthrough(path)? {
            Some(local) => Ok(local),
            None => self.resolve(path, options).await,
        }
    }

    pub async fn resolve_reference(
        &self,
        reference: &RemoteReference,
        options: &ResolveOptions,
    ) -> Result<PathBuf> {
        let local_path = self.local_path(reference);

        if options.mode == DownloadMode::Never {
            tracing::debug!("Download disabled, using {}", local_path.display());
            return Ok(local_path);
        }

        if reference.is_prefix() {
            self.sync_prefix(reference, &local_path, options).await?;
            return Ok(local_path);
        }

        if options.mode == DownloadMode::IfMissing && LocalFile::stat(&local_path)?.is_some() {
            tracing::debug!("Local copy exists: {}", local_path.display());
            return Ok(local_path);
        }

        match self.store.head(reference).await? {
            Some(meta) => {
                if !options.include.is_empty() {
                    return Err(MirrorError::InvalidOption(
                        "include patterns are only allowed for prefixes".to_string(),
                    ));
                }
                self.sync_object(reference, &meta, &local_path, options.mode)
                    .await?;
            }
            // No object under this exact key: treat it as a prefix
            None => self.sync_prefix(reference, &local_path, options).await?,
        }

        Ok(local_path)
    }

    /// Download one object unless the local copy is fresh. Returns true if downloaded.
    async fn sync_object(
        &self,
        reference: &RemoteReference,
        meta: &ObjectMeta,
        local_path: &Path,
        mode: DownloadMode,
    ) -> Result<bool> {
        if let Some(existing) = LocalFile::stat(local_path)? {
            if existing.is_fresh(meta, mode) {
                tracing::debug!("Up to date: {}", local_path.display());
                return Ok(false);
            }
        }

        ensure_parent(local_path)?;
        tracing::info!("Downloading {} to {}", reference, local_path.display());
        self.store.download(reference, local_path).await?;

        if let Some(modified) = meta.last_modified {
            set_modified(local_path, modified)?;
        }

        Ok(true)
    }

    async fn sync_prefix(
        &self,
        reference: &RemoteReference,
        local_dir: &Path,
        options: &ResolveOptions,
    ) -> Result<()> {
        let mode = options.mode.for_prefix();
        let prefix = reference.list_prefix();

        let objects: Vec<ObjectMeta> = self
            .store
            .list(reference.bucket(), &prefix)
            .await?
            .into_iter()
            .filter(|o| !o.key.ends_with('/'))
            .collect();

        if objects.is_empty() {
            return Err(MirrorError::remote(reference, RemoteFailure::NoObjectFound));
        }

        let mut downloaded = 0usize;
        let mut up_to_date = 0usize;

        for meta in &objects {
            let Some(relative) = meta.key.strip_prefix(prefix.as_str()) else {
                continue;
            };
            if relative
                .split('/')
                .any(|s| s.is_empty() || s == "." || s == "..")
            {
                tracing::warn!("Skipping object with unsafe key: {}", meta.key);
                continue;
            }
            if !options.includes(relative) {
                continue;
            }

            let child = reference.child(relative);
            let local_path = self.local_path(&child);
            if self.sync_object(&child, meta, &local_path, mode).await? {
                downloaded += 1;
            } else {
                up_to_date += 1;
            }
        }

        tracing::info!(
            "Synced {} to {}: {} downloaded, {} up to date",
            reference,
            local_dir.display(),
            downloaded,
            up_to_date
        );

        Ok(())
    }
}

/// Return `path` unchanged if it is a plain local path
///
/// Anything carrying a URI scheme (`name:` with a letter first, then letters,
/// digits, `+`, `-` or `.`) yields None and must go through `resolve`, so
/// `s3:bucket/a.csv` is rejected there instead of being read as a file name.
/// A network location without a scheme (`//host/...`) is an error.
pub fn local_passthrough(path: &str) -> Result<Option<PathBuf>> {
    if has_scheme(path) {
        return Ok(None);
    }
    if path.starts_with("//") {
        return Err(MirrorError::invalid(path, InvalidReason::WrongScheme));
    }
    Ok(Some(PathBuf::from(path)))
}

fn has_scheme(path: &str) -> bool {
    let Some((scheme, _)) = path.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Find and read the dataset manifest under a prefix
///
/// Returns the reference of the manifest that was found and its UTF-8 body.
pub async fn fetch_manifest<S: RemoteStore + ?Sized>(
    store: &S,
    uri: &str,
) -> Result<(RemoteReference, String)> {
    let reference = RemoteReference::parse(uri)?;

    for name in MANIFEST_FILENAMES {
        let candidate = reference.child(name);
        if let Some(body) = store.get(&candidate).await? {
            let text = String::from_utf8(body).map_err(|e| {
                MirrorError::remote(
                    &candidate,
                    RemoteFailure::Other(format!("manifest is not valid UTF-8: {e}")),
                )
            })?;
            return Ok((candidate, text));
        }
    }

    Err(MirrorError::remote(reference, RemoteFailure::NoObjectFound))
}
