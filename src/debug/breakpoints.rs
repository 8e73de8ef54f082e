//! Front end line breakpoints reconciled against remote-confirmed ones.
//!
//! The remote side replaces the whole breakpoint set registered under a
//! client id on every call, so the tracked list for a source path is replaced
//! wholesale too.

use crate::dap::{Breakpoint, Source, SourceBreakpoint};
use crate::remote::{ListenerScope, PathResolver, RemoteBreakpoint, RemoteDebugClient};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// A breakpoint as the controller remembers it for a source path.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedBreakpoint {
    pub verified: bool,
    pub line: i32,
    pub source: Source,
    /// Remote token, present only on verified breakpoints.
    pub remote_id: Option<String>,
}

impl TrackedBreakpoint {
    fn unverified(line: i32, source: &Source) -> Self {
        Self {
            verified: false,
            line,
            source: source.clone(),
            remote_id: None,
        }
    }

    pub fn to_dap(&self) -> Breakpoint {
        Breakpoint {
            id: None,
            verified: self.verified,
            message: None,
            source: Some(self.source.clone()),
            line: Some(self.line),
            column: Some(0),
        }
    }
}

/// Remote breakpoint request for a line of an object's source.
pub fn breakpoint_request(contents_path: &str, line: i32) -> String {
    format!("{}#start={}", contents_path, line)
}

/// Id under which the remote side groups the breakpoints of one source.
pub fn client_id(conn_id: &str, source_path: &str) -> String {
    format!("24:{}{}", conn_id, path_component(source_path))
}

// "adt://conn/sap/prog" -> "/sap/prog"; plain paths are returned unchanged
fn path_component(path: &str) -> &str {
    match path.split_once("://") {
        Some((_, rest)) => rest.find('/').map(|idx| &rest[idx..]).unwrap_or("/"),
        None => path,
    }
}

#[derive(Debug, Default)]
pub struct BreakpointReconciler {
    tracked: RwLock<HashMap<String, Vec<TrackedBreakpoint>>>,
}

impl BreakpointReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send the full breakpoint set of `source` and record what the remote confirmed.
    ///
    /// Never fails: unresolvable sources yield an empty list, a failed remote
    /// call yields one unverified breakpoint per requested line.
    pub async fn set_breakpoints(
        &self,
        conn_id: &str,
        client: &dyn RemoteDebugClient,
        resolver: &dyn PathResolver,
        scope: &ListenerScope,
        source: &Source,
        requested: &[SourceBreakpoint],
    ) -> Vec<Breakpoint> {
        let Some(path) = source.path.clone() else {
            debug!("Ignoring breakpoints for a source without path");
            return Vec::new();
        };

        let tracked = self
            .reconcile(conn_id, client, resolver, scope, &path, source, requested)
            .await;
        let result = tracked.iter().map(TrackedBreakpoint::to_dap).collect();

        self.tracked.write().await.insert(path, tracked);
        result
    }

    #[allow(clippy::too_many_arguments)]
    async fn reconcile(
        &self,
        conn_id: &str,
        client: &dyn RemoteDebugClient,
        resolver: &dyn PathResolver,
        scope: &ListenerScope,
        path: &str,
        source: &Source,
        requested: &[SourceBreakpoint],
    ) -> Vec<TrackedBreakpoint> {
        let object = match resolver.debuggable_object(path).await {
            Ok(Some(object)) => object,
            Ok(None) => {
                debug!("{} is not a debuggable object", path);
                return Vec::new();
            }
            Err(e) => {
                warn!("Failed to resolve breakpoint source {}: {}", path, e);
                return Vec::new();
            }
        };

        let requests: Vec<String> = requested
            .iter()
            .map(|bp| breakpoint_request(&object.contents_path, bp.line))
            .collect();
        let client_id = client_id(conn_id, path);

        let confirmed = match client.set_breakpoints(scope, &client_id, &requests).await {
            Ok(confirmed) => confirmed,
            Err(e) => {
                warn!("Failed to set breakpoints for {}: {}", path, e);
                return requested
                    .iter()
                    .map(|bp| TrackedBreakpoint::unverified(bp.line, source))
                    .collect();
            }
        };

        let tracked: Vec<TrackedBreakpoint> = requested
            .iter()
            .map(|bp| {
                let actual = confirmed.iter().find_map(|remote| match remote {
                    RemoteBreakpoint::Confirmed(c) if c.line as i32 == bp.line => Some(c),
                    _ => None,
                });
                match actual {
                    Some(c) => TrackedBreakpoint {
                        verified: true,
                        line: bp.line,
                        source: Source::new(source.name.clone().unwrap_or_default(), path),
                        remote_id: Some(c.id.clone()),
                    },
                    None => TrackedBreakpoint::unverified(bp.line, source),
                }
            })
            .collect();

        info!(
            "{} of {} breakpoint(s) verified for {}",
            tracked.iter().filter(|bp| bp.verified).count(),
            tracked.len(),
            path
        );
        tracked
    }

    pub async fn get_breakpoints(&self, path: &str) -> Vec<Breakpoint> {
        self.tracked
            .read()
            .await
            .get(path)
            .map(|bps| bps.iter().map(TrackedBreakpoint::to_dap).collect())
            .unwrap_or_default()
    }

    pub async fn tracked(&self, path: &str) -> Vec<TrackedBreakpoint> {
        self.tracked.read().await.get(path).cloned().unwrap_or_default()
    }

    /// Remote tokens of every verified breakpoint across all paths.
    pub async fn remote_tokens(&self) -> Vec<String> {
        self.tracked
            .read()
            .await
            .values()
            .flatten()
            .filter(|bp| bp.verified)
            .filter_map(|bp| bp.remote_id.clone())
            .collect()
    }
}
