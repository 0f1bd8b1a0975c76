// Library root for the sentence collection client: configuration, the
// backend REST client, the polling sync loop and the app orchestrator.
// The terminal front end lives in `sentencebox-tui`.

pub mod api;
pub mod app;
pub mod config;
pub mod model;
pub mod protocol;
pub mod sync;
