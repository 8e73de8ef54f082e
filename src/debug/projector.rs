//! Projection of the remote stack and variable tree onto front end frames,
//! scopes and variables.
//!
//! Remote variable ids are relative to the currently selected stack frame, so
//! every handle is dropped whenever the selected frame can change.

use super::handles::{HandleTable, VariableNode};
use crate::dap::{EvaluateResult, Scope, Source, StackFrame, Variable};
use crate::remote::{MetaType, PathResolver, RemoteDebugClient, RemoteVariable, StackTarget};
use crate::Result;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// Root of the remote variable hierarchy; its children are the scopes.
pub const ROOT_VARIABLE: &str = "@ROOT";
const UNKNOWN_FRAME: &str = "unknown";

/// Display value of a remote variable.
pub fn variable_value(v: &RemoteVariable) -> String {
    if v.meta_type == MetaType::Table {
        let kind = v
            .technical_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(v.meta_type.as_str());
        return format!("{} {} lines", kind, v.table_lines);
    }
    if v.meta_type.is_complex() {
        return v.meta_type.as_str().to_string();
    }
    v.value.clone()
}

fn table_row_ids(node: &VariableNode) -> Vec<String> {
    (1..=node.lines)
        .map(|row| format!("{}[{}]", node.id, row))
        .collect()
}

fn frame(id: i32, path: &str, line: i32, position: Option<i32>, uri: Option<String>) -> StackFrame {
    let name = path.rsplit('/').next().unwrap_or(path).to_string();
    StackFrame {
        id,
        source: Some(Source::new(name.clone(), path)),
        name,
        line,
        column: 0,
        stack_position: position,
        stack_uri: uri,
    }
}

#[derive(Debug, Default)]
pub struct Projector {
    frames: RwLock<Vec<StackFrame>>,
    /// Frame the remote side currently has selected.
    current_frame: Mutex<Option<i32>>,
    handles: Mutex<HandleTable>,
}

impl Projector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the frame list from the remote stack trace.
    ///
    /// A frame whose location cannot be resolved becomes an "unknown"
    /// placeholder; the rest of the trace is kept.
    pub async fn update_stack(
        &self,
        client: &dyn RemoteDebugClient,
        resolver: &dyn PathResolver,
    ) -> Result<()> {
        let trace = client.stack_trace(false).await?;

        let mut frames = Vec::with_capacity(trace.stack.len());
        for (id, entry) in trace.stack.into_iter().enumerate() {
            let id = id as i32;
            match resolver.resolve_stack_uri(&entry.uri).await {
                Ok(path) => frames.push(frame(
                    id,
                    &path,
                    entry.line as i32,
                    Some(entry.stack_position),
                    entry.stack_uri,
                )),
                Err(e) => {
                    warn!("Failed to resolve stack frame {} ({}): {}", id, entry.uri, e);
                    frames.push(frame(id, UNKNOWN_FRAME, 0, None, None));
                }
            }
        }
        debug!("Stack updated with {} frame(s)", frames.len());

        *self.frames.write().await = frames;
        *self.current_frame.lock().await = Some(0);
        self.handles.lock().await.reset();
        Ok(())
    }

    pub async fn stack(&self) -> Vec<StackFrame> {
        self.frames.read().await.clone()
    }

    pub async fn clear(&self) {
        self.frames.write().await.clear();
        *self.current_frame.lock().await = None;
        self.handles.lock().await.reset();
    }

    pub async fn get_scopes(&self, client: &dyn RemoteDebugClient, frame_id: i32) -> Result<Vec<Scope>> {
        self.handles.lock().await.reset();

        let target = self
            .frames
            .read()
            .await
            .iter()
            .find(|f| f.id == frame_id)
            .cloned();
        if let Some(frame) = target {
            let mut current = self.current_frame.lock().await;
            if *current != Some(frame_id) {
                let position = match (frame.stack_uri, frame.stack_position) {
                    (Some(uri), _) => Some(StackTarget::Uri(uri)),
                    (None, Some(position)) => Some(StackTarget::Position(position)),
                    (None, None) => None,
                };
                if let Some(position) = position {
                    debug!("Selecting stack frame {} ({:?})", frame_id, position);
                    client.go_to_stack(&position).await?;
                    *current = Some(frame_id);
                }
            }
        }

        let root = client.child_variables(&[ROOT_VARIABLE.to_string()]).await?;
        let mut handles = self.handles.lock().await;
        Ok(root
            .hierarchies
            .into_iter()
            .map(|h| {
                let name = h.child_name.filter(|n| !n.is_empty()).unwrap_or_else(|| h.child_id.clone());
                let variables_reference = handles.create(VariableNode::scope(h.child_id, name.clone()));
                Scope {
                    name,
                    variables_reference,
                    expensive: true,
                }
            })
            .collect())
    }

    /// Children of a previously returned scope or variable.
    ///
    /// An unknown handle yields an empty list: it belongs to a tree that has
    /// already been reset.
    pub async fn get_variables(&self, client: &dyn RemoteDebugClient, handle: i32) -> Result<Vec<Variable>> {
        let Some(node) = self.handles.lock().await.get(handle).cloned() else {
            debug!("Variable handle {} is stale", handle);
            return Ok(Vec::new());
        };

        let children = if node.is_table() {
            if node.lines == 0 {
                return Ok(Vec::new());
            }
            client.variables(&table_row_ids(&node)).await?
        } else {
            client.child_variables(&[node.id.clone()]).await?.variables
        };

        let mut handles = self.handles.lock().await;
        Ok(children
            .into_iter()
            .map(|v| Variable {
                value: variable_value(&v),
                type_: v.technical_type.clone(),
                variables_reference: Self::expand(&mut handles, &v),
                memory_reference: Some(v.id.clone()),
                name: v.name,
            })
            .collect())
    }

    /// Look the expression up as a variable id.
    pub async fn evaluate(&self, client: &dyn RemoteDebugClient, expression: &str) -> Result<Option<EvaluateResult>> {
        let found = client.variables(&[expression.to_string()]).await?;
        let Some(v) = found.into_iter().next() else {
            return Ok(None);
        };

        let variables_reference = Self::expand(&mut *self.handles.lock().await, &v);
        Ok(Some(EvaluateResult {
            result: variable_value(&v),
            variables_reference,
        }))
    }

    fn expand(handles: &mut HandleTable, v: &RemoteVariable) -> i32 {
        if !v.meta_type.is_complex() {
            return 0;
        }
        handles.create(VariableNode {
            id: v.id.clone(),
            name: v.name.clone(),
            meta: Some(v.meta_type),
            lines: v.table_lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{ChildVariables, Hierarchy, RemoteStackEntry, StackTrace};
    use crate::test_support::{MockClient, MockResolver};
    use crate::Error;

    fn var(id: &str, meta: MetaType, value: &str, lines: u32) -> RemoteVariable {
        RemoteVariable {
            id: id.to_string(),
            name: id.to_string(),
            value: value.to_string(),
            meta_type: meta,
            technical_type: None,
            table_lines: lines,
        }
    }

    fn entry(position: i32) -> RemoteStackEntry {
        RemoteStackEntry {
            uri: format!("/sap/bc/adt/programs/programs/zprog{}/source/main", position),
            line: 10 + position as u32,
            stack_position: position,
            stack_uri: None,
            program_name: None,
        }
    }

    fn root_with(children: &[&str]) -> ChildVariables {
        ChildVariables {
            hierarchies: children
                .iter()
                .map(|c| Hierarchy {
                    parent_id: ROOT_VARIABLE.to_string(),
                    child_id: c.to_string(),
                    child_name: None,
                })
                .collect(),
            variables: Vec::new(),
        }
    }

    #[test]
    fn test_variable_value_rendering() {
        let mut table = var("LT_DATA", MetaType::Table, "", 3);
        assert_eq!(variable_value(&table), "table 3 lines");
        table.technical_type = Some("STANDARD TABLE".to_string());
        assert_eq!(variable_value(&table), "STANDARD TABLE 3 lines");

        assert_eq!(variable_value(&var("LS_ROW", MetaType::Structure, "", 0)), "structure");
        assert_eq!(variable_value(&var("LV_X", MetaType::Simple, "42", 0)), "42");
    }

    #[tokio::test]
    async fn test_update_stack_keeps_unresolved_frames() {
        let mut client = MockClient::new();
        client
            .expect_stack_trace()
            .returning(|_| Ok(StackTrace { stack: (0..5).map(entry).collect() }));
        let mut resolver = MockResolver::new();
        resolver.expect_resolve_stack_uri().returning(|uri| {
            if uri.contains("zprog2") {
                Err(Error::Internal("not in workspace".to_string()))
            } else {
                Ok(format!("/ws{}", uri))
            }
        });
        let projector = Projector::new();

        projector.update_stack(&client, &resolver).await.unwrap();
        let stack = projector.stack().await;

        assert_eq!(stack.len(), 5);
        assert_eq!(stack.iter().map(|f| f.id).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        assert_eq!(stack[2].name, "unknown");
        assert_eq!(stack[2].line, 0);
        assert!(stack[2].stack_position.is_none());
        for idx in [0usize, 1, 3, 4] {
            assert_eq!(stack[idx].name, "main");
            assert_eq!(stack[idx].stack_position, Some(idx as i32));
            assert_eq!(stack[idx].line, 10 + idx as i32);
        }
    }

    #[tokio::test]
    async fn test_scopes_navigate_only_when_frame_changes() {
        let mut client = MockClient::new();
        client
            .expect_stack_trace()
            .returning(|_| Ok(StackTrace { stack: (0..2).map(entry).collect() }));
        client
            .expect_go_to_stack()
            .times(1)
            .withf(|target| *target == StackTarget::Position(1))
            .returning(|_| Ok(()));
        client
            .expect_child_variables()
            .returning(|_| Ok(root_with(&["LOCALS", "GLOBALS"])));
        let mut resolver = MockResolver::new();
        resolver.expect_resolve_stack_uri().returning(|uri| Ok(uri.to_string()));
        let projector = Projector::new();
        projector.update_stack(&client, &resolver).await.unwrap();

        let scopes = projector.get_scopes(&client, 0).await.unwrap();
        assert_eq!(scopes.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(), vec!["LOCALS", "GLOBALS"]);

        projector.get_scopes(&client, 1).await.unwrap();
        projector.get_scopes(&client, 1).await.unwrap();
    }

    #[tokio::test]
    async fn test_handles_die_on_next_scopes_call() {
        let mut client = MockClient::new();
        client
            .expect_child_variables()
            .withf(|ids| ids == [ROOT_VARIABLE.to_string()])
            .returning(|_| Ok(root_with(&["LOCALS"])));
        client
            .expect_child_variables()
            .withf(|ids| ids == ["LOCALS".to_string()])
            .times(1)
            .returning(|_| {
                Ok(ChildVariables {
                    hierarchies: Vec::new(),
                    variables: vec![var("LV_X", MetaType::Simple, "1", 0)],
                })
            });
        let projector = Projector::new();

        let scopes = projector.get_scopes(&client, 0).await.unwrap();
        let handle = scopes[0].variables_reference;
        let vars = projector.get_variables(&client, handle).await.unwrap();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].variables_reference, 0);

        projector.get_scopes(&client, 0).await.unwrap();
        let stale = projector.get_variables(&client, handle).await.unwrap();
        assert!(stale.is_empty());
    }

    #[tokio::test]
    async fn test_empty_table_issues_no_remote_call() {
        let mut client = MockClient::new();
        client.expect_child_variables().returning(|_| {
            Ok(ChildVariables {
                hierarchies: Vec::new(),
                variables: vec![var("LT_EMPTY", MetaType::Table, "", 0)],
            })
        });
        client.expect_variables().never();
        let projector = Projector::new();
        let table_handle = {
            let mut handles = projector.handles.lock().await;
            handles.create(VariableNode::scope("LOCALS", "LOCALS"))
        };

        let vars = projector.get_variables(&client, table_handle).await.unwrap();
        assert_eq!(vars[0].value, "table 0 lines");
        assert!(vars[0].variables_reference > 0);

        let rows = projector.get_variables(&client, vars[0].variables_reference).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_table_rows_fetched_in_one_batch() {
        let mut client = MockClient::new();
        client
            .expect_variables()
            .times(1)
            .withf(|ids| ids == ["LT_DATA[1]".to_string(), "LT_DATA[2]".to_string(), "LT_DATA[3]".to_string()])
            .returning(|ids| {
                Ok(ids
                    .iter()
                    .map(|id| var(id, MetaType::Structure, "", 0))
                    .collect())
            });
        let projector = Projector::new();
        let handle = projector.handles.lock().await.create(VariableNode {
            id: "LT_DATA".to_string(),
            name: "LT_DATA".to_string(),
            meta: Some(MetaType::Table),
            lines: 3,
        });

        let rows = projector.get_variables(&client, handle).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].name, "LT_DATA[3]");
        assert!(rows.iter().all(|r| r.value == "structure" && r.variables_reference > 0));
    }

    #[tokio::test]
    async fn test_evaluate() {
        let mut client = MockClient::new();
        client
            .expect_variables()
            .withf(|ids| ids == ["LV_COUNT".to_string()])
            .returning(|_| Ok(vec![var("LV_COUNT", MetaType::Simple, "7", 0)]));
        client
            .expect_variables()
            .withf(|ids| ids == ["NOPE".to_string()])
            .returning(|_| Ok(Vec::new()));
        let projector = Projector::new();

        let found = projector.evaluate(&client, "LV_COUNT").await.unwrap().unwrap();
        assert_eq!(found.result, "7");
        assert_eq!(found.variables_reference, 0);

        assert!(projector.evaluate(&client, "NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scopes_prefer_stack_uri_over_position() {
        let mut client = MockClient::new();
        client.expect_stack_trace().returning(|_| {
            let mut stack: Vec<RemoteStackEntry> = (0..2).map(entry).collect();
            stack[1].stack_uri = Some("/sap/bc/adt/debugger/stack/type/ABAP/position/1".to_string());
            Ok(StackTrace { stack })
        });
        client
            .expect_go_to_stack()
            .times(1)
            .withf(|target| {
                *target == StackTarget::Uri("/sap/bc/adt/debugger/stack/type/ABAP/position/1".to_string())
            })
            .returning(|_| Ok(()));
        client
            .expect_child_variables()
            .returning(|_| Ok(root_with(&["LOCALS"])));
        let mut resolver = MockResolver::new();
        resolver.expect_resolve_stack_uri().returning(|uri| Ok(uri.to_string()));
        let projector = Projector::new();
        projector.update_stack(&client, &resolver).await.unwrap();

        let scopes = projector.get_scopes(&client, 1).await.unwrap();
        assert_eq!(scopes.len(), 1);
    }

    #[tokio::test]
    async fn test_update_stack_invalidates_issued_handles() {
        let mut client = MockClient::new();
        client
            .expect_stack_trace()
            .returning(|_| Ok(StackTrace { stack: (0..1).map(entry).collect() }));
        client
            .expect_child_variables()
            .withf(|ids| ids == [ROOT_VARIABLE.to_string()])
            .returning(|_| Ok(root_with(&["LOCALS"])));
        client
            .expect_child_variables()
            .withf(|ids| ids == ["LOCALS".to_string()])
            .never();
        let mut resolver = MockResolver::new();
        resolver.expect_resolve_stack_uri().returning(|uri| Ok(uri.to_string()));
        let projector = Projector::new();
        projector.update_stack(&client, &resolver).await.unwrap();

        let handle = projector.get_scopes(&client, 0).await.unwrap()[0].variables_reference;
        projector.update_stack(&client, &resolver).await.unwrap();

        let vars = projector.get_variables(&client, handle).await.unwrap();
        assert!(vars.is_empty());
    }
}
