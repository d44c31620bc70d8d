//! Per-id fragment caches and URL / display-path resolution.
//!
//! Both caches are built in one explicit pass over every candidate before
//! any node is assembled, so resolution is a pure lookup with no hidden
//! mutation. A node's URL is the `/`-join of its ancestors' cached URL
//! fragments; its display path is the same join over display names.

use std::collections::HashMap;

use pagetree_shared::{NodeId, ParseOptions, ROOT_SENTINEL};

use crate::sources::{Candidate, URL_NAME_KEY};

pub(crate) struct FragmentCache {
    urls: HashMap<NodeId, String>,
    names: HashMap<NodeId, String>,
}

impl FragmentCache {
    /// Build both fragment caches from the full candidate set.
    ///
    /// URL fragment precedence: per-id prefix override, then a same-named
    /// non-blank `urlName` property, then the source slug. The display-name
    /// fragment is always the raw display name.
    pub fn build(candidates: &[Candidate], options: &ParseOptions) -> Self {
        let mut urls = HashMap::new();
        let mut names = HashMap::new();

        for cand in candidates {
            if let Some(name) = &cand.name_fragment {
                names.insert(cand.id, name.clone());
            }

            let fragment = match options.url_prefixes.get(&cand.id) {
                Some(prefix) => Some(prefix.clone()),
                None => cand
                    .props
                    .text(URL_NAME_KEY)
                    .filter(|s| !s.trim().is_empty())
                    .or_else(|| cand.slug_fragment.clone()),
            };
            if let Some(fragment) = fragment {
                urls.insert(cand.id, fragment);
            }
        }

        Self { urls, names }
    }

    /// Join the chain's URL fragments, root sentinel skipped. `None` when
    /// any ancestor has no cached fragment.
    ///
    /// A non-blank alias short-circuits after the first fragment: if that
    /// ancestor has a prefix override the alias is appended to the URL so
    /// far (leading slash trimmed), otherwise the alias alone is the URL.
    pub fn resolve_url(
        &self,
        chain: &[NodeId],
        alias: Option<&str>,
        options: &ParseOptions,
    ) -> Option<String> {
        let mut url = String::new();
        let mut sep = "";
        for &id in chain {
            if id == ROOT_SENTINEL {
                continue;
            }
            let fragment = self.urls.get(&id)?;
            url.push_str(sep);
            url.push_str(fragment);
            sep = "/";

            if let Some(alias) = alias {
                if options.url_prefixes.contains_key(&id) {
                    return Some(format!("{url}/{}", alias.trim_start_matches('/')));
                }
                return Some(alias.to_string());
            }
        }
        Some(url)
    }

    /// Join the chain's display-name fragments, root sentinel skipped.
    /// `None` when any ancestor has no cached name.
    pub fn resolve_display_path(&self, chain: &[NodeId]) -> Option<Vec<String>> {
        chain
            .iter()
            .filter(|&&id| id != ROOT_SENTINEL)
            .map(|id| self.names.get(id).cloned())
            .collect()
    }
}
