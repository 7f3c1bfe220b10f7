use serde_json::{json, Value};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::model::ResultRow;

pub const VIEW_ITEM_EVENT: &str = "powerSearchViewItem";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewItemSignal {
    pub url: String,
    pub title: String,
    pub kind: Option<String>,
}

impl ViewItemSignal {
    /// `None` unless both `url` and `title` are non-empty strings.
    pub fn from_detail(detail: &Value) -> Option<Self> {
        let text = |field: &str| {
            detail
                .get(field)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Some(Self {
            url: text("url")?,
            title: text("title")?,
            kind: text("type"),
        })
    }

    pub fn detail_for_row(row: &ResultRow) -> Value {
        json!({
            "url": row.path(),
            "title": row.filename().unwrap_or("Page"),
            "type": row.file_type(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerState {
    open: Option<ViewItemSignal>,
}

impl ViewerState {
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn item(&self) -> Option<&ViewItemSignal> {
        self.open.as_ref()
    }

    pub fn open(&mut self, signal: ViewItemSignal) {
        self.open = Some(signal);
    }

    pub fn close(&mut self) -> bool {
        self.open.take().is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ViewItemEmitter {
    sender: UnboundedSender<Value>,
}

impl ViewItemEmitter {
    pub fn emit(&self, detail: Value) -> bool {
        self.sender.send(detail).is_ok()
    }
}

pub struct ViewItemChannel {
    sender: UnboundedSender<Value>,
    receiver: UnboundedReceiver<Value>,
}

impl Default for ViewItemChannel {
    fn default() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }
}

impl ViewItemChannel {
    pub fn emitter(&self) -> ViewItemEmitter {
        ViewItemEmitter {
            sender: self.sender.clone(),
        }
    }

    pub fn drain_into(&mut self, viewer: &mut ViewerState) -> usize {
        let mut opened = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(detail) => match ViewItemSignal::from_detail(&detail) {
                    Some(signal) => {
                        viewer.open(signal);
                        opened += 1;
                    }
                    None => {
                        tracing::warn!(signal = VIEW_ITEM_EVENT, %detail, "ignoring malformed view item signal");
                    }
                },
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        opened
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::ViewItemSignal;

    #[test]
    fn accepts_complete_payload() {
        let signal = ViewItemSignal::from_detail(&json!({
            "url": "https://contoso.sharepoint.com/sites/hr/SitePages/Home.aspx",
            "title": "Page",
            "type": "aspx",
        }))
        .unwrap();
        assert_eq!(signal.kind.as_deref(), Some("aspx"));
    }

    #[test]
    fn rejects_missing_or_blank_fields() {
        assert!(ViewItemSignal::from_detail(&json!({ "title": "Page" })).is_none());
        assert!(ViewItemSignal::from_detail(&json!({ "url": "https://x", "title": " " })).is_none());
        assert!(ViewItemSignal::from_detail(&json!("not an object")).is_none());
        assert!(ViewItemSignal::from_detail(&json!({ "url": 4, "title": "Page" })).is_none());
    }
}
