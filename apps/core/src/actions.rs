use thiserror::Error;

use crate::display::split_url;
use crate::model::ResultRow;
use crate::viewer::{ViewItemEmitter, ViewItemSignal};

pub const DEFAULT_DOWNLOAD_NAME: &str = "download";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultAction {
    View,
    Open,
    OpenFolder,
    Download,
    CopyLink,
}

impl ResultAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::View => "View",
            Self::Open => "Open",
            Self::OpenFolder => "Open folder",
            Self::Download => "Download",
            Self::CopyLink => "Copy link",
        }
    }
}

pub fn available_actions(row: &ResultRow) -> Vec<ResultAction> {
    let mut actions = Vec::with_capacity(5);
    if row.is_page() {
        actions.push(ResultAction::View);
    }
    actions.extend([
        ResultAction::Open,
        ResultAction::OpenFolder,
        ResultAction::Download,
        ResultAction::CopyLink,
    ]);
    actions
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("result has no path")]
    MissingPath,
    #[error("view is only available for pages")]
    NotViewable,
    #[error("viewer is not listening")]
    ViewerClosed,
    #[error("{0}")]
    Host(String),
}

pub trait DesktopBridge {
    fn open_url(&mut self, url: &str) -> Result<(), ActionError>;
    fn copy_text(&mut self, text: &str) -> Result<(), ActionError>;
    fn download(&mut self, url: &str, file_name: &str) -> Result<(), ActionError>;
}

fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(index) => &path[..index],
        None => path,
    }
}

// Characters a url path carries percent-encoded; existing escapes are kept.
fn encode_path(path: &str) -> String {
    let mut encoded = String::with_capacity(path.len());
    for ch in path.chars() {
        if ch.is_ascii_graphic() && !matches!(ch, '"' | '<' | '>' | '`' | '{' | '}') {
            encoded.push(ch);
        } else {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).bytes() {
                encoded.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    encoded
}

/// Folder containing the item, with list `/Forms` segments removed and the
/// file name passed as a `q` filter so the library highlights it.
pub fn folder_url(path: &str, file_name: Option<&str>) -> String {
    let folder = match split_url(path) {
        Some((origin, url_path)) => format!("{origin}{}", encode_path(parent_of(url_path))),
        None => parent_of(path).to_string(),
    };
    let folder = folder.replace("/Forms", "");
    match file_name.filter(|name| !name.is_empty()) {
        Some(name) => format!("{folder}?q={}", urlencoding::encode(name)),
        None => folder,
    }
}

pub fn run_action<B: DesktopBridge>(
    action: ResultAction,
    row: &ResultRow,
    bridge: &mut B,
    viewer: &ViewItemEmitter,
) -> Result<(), ActionError> {
    let path = row.path().ok_or(ActionError::MissingPath)?;
    match action {
        ResultAction::View => {
            if !row.is_page() {
                return Err(ActionError::NotViewable);
            }
            if !viewer.emit(ViewItemSignal::detail_for_row(row)) {
                return Err(ActionError::ViewerClosed);
            }
            Ok(())
        }
        ResultAction::Open => bridge.open_url(path),
        ResultAction::OpenFolder => bridge.open_url(&folder_url(path, row.filename())),
        ResultAction::Download => {
            bridge.download(path, row.filename().unwrap_or(DEFAULT_DOWNLOAD_NAME))
        }
        ResultAction::CopyLink => bridge.copy_text(path),
    }
}

pub fn trigger<B: DesktopBridge>(
    action: ResultAction,
    row: &ResultRow,
    bridge: &mut B,
    viewer: &ViewItemEmitter,
) -> bool {
    match run_action(action, row, bridge, viewer) {
        Ok(()) => {
            tracing::debug!(action = action.label(), "result action completed");
            true
        }
        Err(error) => {
            tracing::warn!(action = action.label(), %error, "result action failed");
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCall {
    Open(String),
    Copy(String),
    Download { url: String, file_name: String },
}

#[derive(Debug, Default)]
pub struct RecordingBridge {
    pub calls: Vec<BridgeCall>,
    pub fail_with: Option<String>,
}

impl RecordingBridge {
    fn record(&mut self, call: BridgeCall) -> Result<(), ActionError> {
        if let Some(message) = &self.fail_with {
            return Err(ActionError::Host(message.clone()));
        }
        self.calls.push(call);
        Ok(())
    }
}

impl DesktopBridge for RecordingBridge {
    fn open_url(&mut self, url: &str) -> Result<(), ActionError> {
        self.record(BridgeCall::Open(url.to_string()))
    }

    fn copy_text(&mut self, text: &str) -> Result<(), ActionError> {
        self.record(BridgeCall::Copy(text.to_string()))
    }

    fn download(&mut self, url: &str, file_name: &str) -> Result<(), ActionError> {
        self.record(BridgeCall::Download {
            url: url.to_string(),
            file_name: file_name.to_string(),
        })
    }
}
