pub mod actions;
pub mod client;
pub mod config;
pub mod contract;
pub mod debounce;
pub mod display;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod overlay_state;
pub mod preference_store;
pub mod preferences;
pub mod query_builder;
pub mod runtime;
pub mod sections;
pub mod session;
pub mod shortcut;
pub mod viewer;
