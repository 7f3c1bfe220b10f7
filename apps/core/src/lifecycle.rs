use crate::preference_store::PreferenceStore;
use crate::session::{SearchSession, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderName {
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderContent {
    pub name: PlaceholderName,
    pub dom_element: Option<String>,
}

pub trait PlaceholderProvider {
    fn try_create_content(&mut self, name: PlaceholderName) -> Option<PlaceholderContent>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageGlobals {
    pub navigated_subscribed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    Mounted,
    AlreadyMounted,
    PlaceholderMissing,
    NoRenderTarget,
    Failed,
}

pub struct Mounted<S: PreferenceStore> {
    pub placeholder: PlaceholderContent,
    pub session: SearchSession<S>,
}

pub struct ExtensionHost<S, F>
where
    S: PreferenceStore,
    F: FnMut() -> Result<SearchSession<S>, SessionError>,
{
    make_session: F,
    placeholder: Option<PlaceholderContent>,
    mounted: Option<Mounted<S>>,
}

impl<S, F> ExtensionHost<S, F>
where
    S: PreferenceStore,
    F: FnMut() -> Result<SearchSession<S>, SessionError>,
{
    pub fn new(make_session: F) -> Self {
        Self {
            make_session,
            placeholder: None,
            mounted: None,
        }
    }

    pub fn on_init(&mut self, page: &mut PageGlobals) -> bool {
        if page.navigated_subscribed {
            return false;
        }
        page.navigated_subscribed = true;
        tracing::debug!("subscribed to navigated event");
        true
    }

    pub fn on_navigated<P: PlaceholderProvider>(&mut self, provider: &mut P) -> MountOutcome {
        if self.mounted.is_some() || self.placeholder.is_some() {
            return MountOutcome::AlreadyMounted;
        }

        let Some(placeholder) = provider.try_create_content(PlaceholderName::Bottom) else {
            tracing::error!("entry button cannot be displayed: bottom placeholder not found");
            return MountOutcome::PlaceholderMissing;
        };

        if placeholder.dom_element.is_none() {
            self.placeholder = Some(placeholder);
            return MountOutcome::NoRenderTarget;
        }

        match (self.make_session)() {
            Ok(session) => {
                tracing::info!("power search mounted");
                self.mounted = Some(Mounted {
                    placeholder,
                    session,
                });
                MountOutcome::Mounted
            }
            Err(error) => {
                tracing::error!(%error, "power search failed to start");
                self.placeholder = Some(placeholder);
                MountOutcome::Failed
            }
        }
    }

    pub fn on_dispose(&mut self) -> bool {
        self.placeholder = None;
        match self.mounted.take() {
            Some(_) => {
                tracing::debug!("power search disposed");
                true
            }
            None => false,
        }
    }

    pub fn mounted(&self) -> Option<&Mounted<S>> {
        self.mounted.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut SearchSession<S>> {
        self.mounted.as_mut().map(|mounted| &mut mounted.session)
    }
}

#[derive(Debug, Default)]
pub struct StaticPlaceholders {
    pub bottom: Option<PlaceholderContent>,
    pub requests: usize,
}

impl StaticPlaceholders {
    pub fn with_bottom(element: &str) -> Self {
        Self {
            bottom: Some(PlaceholderContent {
                name: PlaceholderName::Bottom,
                dom_element: Some(element.to_string()),
            }),
            requests: 0,
        }
    }
}

impl PlaceholderProvider for StaticPlaceholders {
    fn try_create_content(&mut self, name: PlaceholderName) -> Option<PlaceholderContent> {
        self.requests += 1;
        match name {
            PlaceholderName::Bottom => self.bottom.clone(),
            PlaceholderName::Top => None,
        }
    }
}
