use serde::{Deserialize, Serialize};

/// Which debuggees the listener registers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebuggingMode {
    /// Any process started by the session user.
    #[default]
    User,
    /// Only processes started from this terminal.
    Terminal,
}

impl DebuggingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebuggingMode::User => "user",
            DebuggingMode::Terminal => "terminal",
        }
    }
}

/// Identifies one listener registration on the remote side.
///
/// Listen, delete-listener and breakpoint calls are all scoped to this tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerScope {
    pub mode: DebuggingMode,
    pub terminal_id: String,
    pub ide_id: String,
    pub username: String,
}

/// A process halted at a breakpoint, as reported by a listen call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debuggee {
    pub debuggee_id: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub program: Option<String>,
}

/// Protocol-level listener failure. Returned, not raised, by a listen call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenerError {
    pub kind: String,
    pub message: String,
}

/// Result of one long-poll listen call.
#[derive(Debug, Clone, PartialEq)]
pub enum ListenOutcome {
    /// The poll ended without a debuggee (listener deleted, server timeout).
    Idle,
    Debuggee(Debuggee),
    ListenerError(ListenerError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachInfo {
    pub is_stepping_possible: bool,
    #[serde(default)]
    pub reached_breakpoints: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepType {
    StepInto,
    StepOver,
    StepReturn,
    StepContinue,
    StepRunToLine,
    StepJumpToLine,
    TerminateDebuggee,
}

impl StepType {
    /// Step kinds that move execution to a caller supplied location.
    pub fn requires_target(&self) -> bool {
        matches!(self, StepType::StepRunToLine | StepType::StepJumpToLine)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::StepInto => "stepInto",
            StepType::StepOver => "stepOver",
            StepType::StepReturn => "stepReturn",
            StepType::StepContinue => "stepContinue",
            StepType::StepRunToLine => "stepRunToLine",
            StepType::StepJumpToLine => "stepJumpToLine",
            StepType::TerminateDebuggee => "terminateDebuggee",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub is_stepping_possible: bool,
    #[serde(default)]
    pub is_termination_possible: bool,
    #[serde(default)]
    pub reached_breakpoints: Vec<String>,
}

/// One frame of the remote call stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteStackEntry {
    /// Object relative location of the frame's source.
    pub uri: String,
    pub line: u32,
    pub stack_position: i32,
    /// Alternative navigation token, preferred over `stack_position` when present.
    #[serde(default)]
    pub stack_uri: Option<String>,
    #[serde(default)]
    pub program_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackTrace {
    pub stack: Vec<RemoteStackEntry>,
}

/// Argument of a go-to-stack call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackTarget {
    Position(i32),
    Uri(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaType {
    Simple,
    String,
    Structure,
    Table,
    DataRef,
    ObjectRef,
    Class,
    Object,
    BoxedComp,
    AnonymComp,
    Unknown,
}

impl MetaType {
    /// Complex values have children and can be expanded by the front end.
    pub fn is_complex(&self) -> bool {
        !matches!(self, MetaType::Simple | MetaType::String | MetaType::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetaType::Simple => "simple",
            MetaType::String => "string",
            MetaType::Structure => "structure",
            MetaType::Table => "table",
            MetaType::DataRef => "dataref",
            MetaType::ObjectRef => "objectref",
            MetaType::Class => "class",
            MetaType::Object => "object",
            MetaType::BoxedComp => "boxedcomp",
            MetaType::AnonymComp => "anonymcomp",
            MetaType::Unknown => "unknown",
        }
    }
}

/// Parent/child edge of the remote variable hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hierarchy {
    pub parent_id: String,
    pub child_id: String,
    #[serde(default)]
    pub child_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteVariable {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub value: String,
    pub meta_type: MetaType,
    #[serde(default)]
    pub technical_type: Option<String>,
    #[serde(default)]
    pub table_lines: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildVariables {
    pub hierarchies: Vec<Hierarchy>,
    pub variables: Vec<RemoteVariable>,
}

/// A breakpoint the remote side accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedBreakpoint {
    /// Token needed to delete the breakpoint again.
    pub id: String,
    pub client_id: String,
    pub uri: String,
    /// Start line of the resolved location.
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteBreakpoint {
    Confirmed(ConfirmedBreakpoint),
    Rejected { message: String },
}

/// Settings persisted on the remote session after every attach.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSettings {
    pub system_debugging: bool,
    pub create_exception_object: bool,
    #[serde(rename = "backgroundRFC")]
    pub background_rfc: bool,
    pub shared_object_debugging: bool,
    pub show_data_aging: bool,
    pub update_debugging: bool,
}

/// A workspace object that can carry breakpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebuggableObject {
    pub contents_path: String,
}
