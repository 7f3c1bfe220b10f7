use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;

use powersearch_core::actions::{BridgeCall, RecordingBridge, ResultAction};
use powersearch_core::client::{ClientError, SearchClient};
use powersearch_core::contract::{
    RawKeyValue, RawQueryResult, RawRelevantResults, RawRow, RawSearchResponse, RawTable,
    SearchRequest,
};
use powersearch_core::orchestrator::FetchOutcome;
use powersearch_core::overlay_state::ShortcutAction;
use powersearch_core::preference_store::{MemoryPreferenceStore, PreferenceStore};
use powersearch_core::preferences::{FileTypeTag, SortOrder, FILE_TYPES_KEY, HISTORY_KEY, SORT_ORDER_KEY};
use powersearch_core::query_builder::SearchTuning;
use powersearch_core::sections::Section;
use powersearch_core::session::SearchSession;

const SITE: &str = "https://contoso.sharepoint.com/sites/hr";

/// Returns the same three rows for every request: a page, a pdf and an image.
struct FixedClient;

impl SearchClient for FixedClient {
    async fn search(&self, _request: &SearchRequest) -> Result<RawSearchResponse, ClientError> {
        let rows = [
            ("Home.aspx", "aspx", "SitePages/Home.aspx"),
            ("Budget.pdf", "pdf", "Shared Documents/Budget.pdf"),
            ("Logo.png", "png", "Shared Documents/Logo.png"),
        ]
        .into_iter()
        .map(|(name, file_type, path)| RawRow {
            cells: vec![
                RawKeyValue::new("Title", name),
                RawKeyValue::new("Filename", name),
                RawKeyValue::new("FileType", file_type),
                RawKeyValue::new("Path", &format!("{SITE}/{path}")),
            ],
        })
        .collect();

        Ok(RawSearchResponse {
            primary_query_result: Some(RawQueryResult {
                relevant_results: Some(RawRelevantResults {
                    table: Some(RawTable { rows }),
                    total_rows: Some(3),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        })
    }
}

fn session_with(store: MemoryPreferenceStore) -> SearchSession<MemoryPreferenceStore> {
    SearchSession::new(store, SearchTuning::default(), Duration::from_millis(300)).unwrap()
}

fn session() -> SearchSession<MemoryPreferenceStore> {
    session_with(MemoryPreferenceStore::default())
}

#[test]
fn restores_persisted_filters_and_sort() {
    let mut store = MemoryPreferenceStore::default();
    store.set(FILE_TYPES_KEY, json!(["pdf"])).unwrap();
    store.set(SORT_ORDER_KEY, json!("asc")).unwrap();
    store.set(HISTORY_KEY, json!(["roadmap", "budget"])).unwrap();

    let session = session_with(store);
    assert_eq!(session.sort_order(), SortOrder::Asc);
    assert_eq!(session.orchestrator().sort(), SortOrder::Asc);
    assert_eq!(
        session.orchestrator().filters(),
        &["FileType:equals(\"pdf\")".to_string()]
    );
    assert_eq!(
        session.recent_searches().entries(),
        &["roadmap".to_string(), "budget".to_string()]
    );
}

#[test]
fn settled_queries_are_recorded_once() {
    let start = Instant::now();
    let mut session = session();

    session.on_query_input("bud", start);
    session.on_query_input("budget", start + Duration::from_millis(100));
    assert_eq!(session.poll(start + Duration::from_millis(300)).unwrap(), None);
    assert_eq!(
        session.poll(start + Duration::from_millis(400)).unwrap().as_deref(),
        Some("budget")
    );
    assert_eq!(session.poll(start + Duration::from_millis(900)).unwrap(), None);

    assert_eq!(session.recent_searches().entries(), &["budget".to_string()]);
    assert_eq!(
        session.preferences().store().get(HISTORY_KEY).unwrap(),
        Some(json!(["budget"]))
    );
}

#[test]
fn whitespace_query_is_not_recorded() {
    let start = Instant::now();
    let mut session = session();
    session.on_query_input("   ", start);
    assert_eq!(session.poll(start + Duration::from_secs(1)).unwrap(), None);
    assert!(session.recent_searches().is_empty());
    assert!(!session.orchestrator().is_enabled());
}

#[test]
fn section_view_overrides_file_type_filters() {
    let mut session = session();
    session.toggle_file_type(FileTypeTag::Pdf).unwrap();
    let pdf_only = vec!["FileType:equals(\"pdf\")".to_string()];
    assert_eq!(session.orchestrator().filters(), pdf_only.as_slice());

    session.enter_section(Section::Pages);
    assert_eq!(
        session.orchestrator().filters(),
        &["or(FileType:equals(\"aspx\"),FileType:equals(\"page\"))".to_string()]
    );

    session.toggle_file_type(FileTypeTag::Docx).unwrap();
    assert_eq!(session.orchestrator().filters().len(), 1);
    assert!(session.orchestrator().filters()[0].contains("aspx"));

    assert!(session.back_to_search());
    assert!(session.orchestrator().filters()[0].contains("docx"));
    assert!(session.orchestrator().filters()[0].contains("pdf"));
}

#[test]
fn closing_clears_query_but_keeps_preferences() {
    let mut session = session();
    session.on_shortcut().unwrap();
    session.set_sort_order(SortOrder::Desc).unwrap();
    session.select_recent("budget").unwrap();
    session.enter_section(Section::Documents);

    assert!(session.close_dialog());
    assert_eq!(session.query_text(), "");
    assert_eq!(session.orchestrator().key().query, "");
    assert_eq!(session.overlay().current_view(), None);
    assert_eq!(session.sort_order(), SortOrder::Desc);
    assert!(session.orchestrator().filters().is_empty());
    assert_eq!(session.recent_searches().entries(), &["budget".to_string()]);
}

#[test]
fn teaching_tip_shows_until_dismissed() {
    let mut session = session();
    assert_eq!(session.on_shortcut().unwrap(), ShortcutAction::OpenAndFocus);
    assert!(session.overlay().teaching_tip_visible());
    session.dismiss_teaching_tip().unwrap();
    session.close_dialog();

    let mut again = session_with(session.preferences().store().clone());
    again.on_shortcut().unwrap();
    assert!(!again.overlay().teaching_tip_visible());
}

#[tokio::test(start_paused = true)]
async fn settle_and_fetch_waits_for_debounce() {
    let mut session = session();
    session.on_query_input("budget", Instant::now());

    let outcome = session.settle_and_fetch(&FixedClient).await.unwrap();
    assert_eq!(outcome, FetchOutcome::Applied { added: 3, has_next_page: false });
    assert_eq!(session.rows().len(), 3);
    assert_eq!(session.recent_searches().entries(), &["budget".to_string()]);

    let groups = session.groups();
    let sections: Vec<Section> = groups.iter().map(|group| group.section).collect();
    assert_eq!(sections, vec![Section::Documents, Section::Pages, Section::Other]);

    assert_eq!(
        session.settle_and_fetch(&FixedClient).await.unwrap(),
        FetchOutcome::Skipped
    );
}

#[tokio::test]
async fn view_action_opens_viewer_for_pages_only() {
    let mut session = session();
    session.select_recent("home").unwrap();
    session.fetch_next_page(&FixedClient).await.unwrap();
    let mut bridge = RecordingBridge::default();

    assert!(!session.trigger_action(ResultAction::View, 1, &mut bridge));
    assert!(!session.viewer().is_open());

    assert!(session.trigger_action(ResultAction::View, 0, &mut bridge));
    let item = session.viewer().item().unwrap();
    assert_eq!(item.title, "Home.aspx");
    assert_eq!(item.url, format!("{SITE}/SitePages/Home.aspx"));

    assert!(session.on_escape());
    assert!(!session.viewer().is_open());
    assert!(bridge.calls.is_empty());
}

#[tokio::test]
async fn link_actions_go_through_the_bridge() {
    let mut session = session();
    session.select_recent("budget").unwrap();
    session.fetch_next_page(&FixedClient).await.unwrap();
    let mut bridge = RecordingBridge::default();

    assert!(session.trigger_action(ResultAction::CopyLink, 1, &mut bridge));
    assert!(session.trigger_action(ResultAction::OpenFolder, 1, &mut bridge));
    assert!(!session.trigger_action(ResultAction::Open, 99, &mut bridge));

    assert_eq!(
        bridge.calls,
        vec![
            BridgeCall::Copy(format!("{SITE}/Shared Documents/Budget.pdf")),
            BridgeCall::Open(format!("{SITE}/Shared%20Documents?q=Budget.pdf")),
        ]
    );
}
