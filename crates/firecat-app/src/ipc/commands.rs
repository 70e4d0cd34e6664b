//! IPC command handlers
//!
//! This module contains handlers for every IPC command from the home page
//! and the chrome.

use super::{IpcMessage, IpcResponse};
use crate::shortcuts::{self, ShortcutAction};
use crate::state::{lock, AppState};
use firecat_core::FirecatResult;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

/// Handle an IPC message and return a response
pub fn handle_message(state: &Arc<Mutex<AppState>>, message: IpcMessage) -> IpcResponse {
    match message {
        // Home page bridge
        IpcMessage::OpenLink { url } => handle_open_link(state, &url),
        IpcMessage::Search { query } => handle_search(state, &query),
        IpcMessage::SaveSettings { settings } => handle_save_settings(state, settings),
        IpcMessage::ResetSettings => handle_reset_settings(state),
        IpcMessage::GetSettings => handle_get_settings(state),
        IpcMessage::ChangeBackground { color } => handle_change_background(state, &color),
        IpcMessage::SetMode { mode } => handle_set_mode(state, &mode),
        IpcMessage::SetBackgroundImage { path } => handle_set_background_image(state, &path),
        IpcMessage::ClearBackgroundImage => handle_clear_background_image(state),

        // Navigation
        IpcMessage::Navigate { url } => handle_navigate(state, &url),
        IpcMessage::GoBack => with_shell(state, |shell| shell.go_back()),
        IpcMessage::GoForward => with_shell(state, |shell| shell.go_forward()),
        IpcMessage::Reload => with_shell(state, |shell| shell.reload()),
        IpcMessage::GoHome => with_shell(state, |shell| shell.go_home()),

        // Tabs
        IpcMessage::NewTab => handle_new_tab(state),
        IpcMessage::CloseTab { index } => with_shell(state, |shell| {
            shell.close_tab(index);
        }),
        IpcMessage::SelectTab { index } => handle_select_tab(state, index),
        IpcMessage::NextTab => with_shell(state, |shell| shell.next_tab()),
        IpcMessage::PreviousTab => with_shell(state, |shell| shell.previous_tab()),
        IpcMessage::GetTabs => handle_get_tabs(state),
        IpcMessage::GetToolbar => handle_get_toolbar(state),

        // History
        IpcMessage::GetHistory => handle_get_history(state),
        IpcMessage::GetSuggestions { input } => handle_get_suggestions(state, &input),
        IpcMessage::ClearHistory => handle_clear_history(state),

        IpcMessage::Shortcut { keys } => handle_shortcut(state, &keys),
    }
}

/// Turn a bridge result into a response, logging failures
fn respond<T: serde::Serialize>(what: &str, result: FirecatResult<T>) -> IpcResponse {
    match result {
        Ok(data) => IpcResponse::success(data),
        Err(e) => {
            error!("{} failed: {}", what, e);
            IpcResponse::error(e.to_string())
        }
    }
}

/// Run a chrome action on the shell and answer with the resulting toolbar
fn with_shell<F>(state: &Arc<Mutex<AppState>>, action: F) -> IpcResponse
where
    F: FnOnce(&mut firecat_shell::BrowserShell),
{
    let state = lock(state);
    let mut shell = lock(&state.shell);
    action(&mut shell);
    IpcResponse::success(shell.toolbar())
}

// Bridge handlers

fn handle_open_link(state: &Arc<Mutex<AppState>>, url: &str) -> IpcResponse {
    debug!("Open link: {}", url);
    let state = lock(state);
    respond("open_link", state.bridge.open_link(url))
}

fn handle_search(state: &Arc<Mutex<AppState>>, query: &str) -> IpcResponse {
    debug!("Search: {}", query);
    let state = lock(state);
    respond("search", state.bridge.search(query))
}

fn handle_save_settings(state: &Arc<Mutex<AppState>>, settings: Value) -> IpcResponse {
    let text = match settings {
        Value::String(text) => text,
        other => other.to_string(),
    };
    let mut state = lock(state);
    respond("save_settings", state.bridge.save_settings(&text))
}

fn handle_reset_settings(state: &Arc<Mutex<AppState>>) -> IpcResponse {
    let mut state = lock(state);
    respond("reset_settings", state.bridge.reset_settings())
}

fn handle_get_settings(state: &Arc<Mutex<AppState>>) -> IpcResponse {
    let mut state = lock(state);
    respond("get_settings", state.bridge.get_settings())
}

fn handle_change_background(state: &Arc<Mutex<AppState>>, color: &str) -> IpcResponse {
    info!("Change background: {}", color);
    let mut state = lock(state);
    respond("change_background", state.bridge.change_background(color))
}

fn handle_set_mode(state: &Arc<Mutex<AppState>>, mode: &str) -> IpcResponse {
    info!("Set mode: {}", mode);
    let mut state = lock(state);
    respond("set_mode", state.bridge.set_mode(mode))
}

fn handle_set_background_image(state: &Arc<Mutex<AppState>>, path: &str) -> IpcResponse {
    let mut state = lock(state);
    respond(
        "set_background_image",
        state
            .bridge
            .set_background_image(Path::new(path))
            .map(|target| json!({ "path": target.to_string_lossy() })),
    )
}

fn handle_clear_background_image(state: &Arc<Mutex<AppState>>) -> IpcResponse {
    let mut state = lock(state);
    respond(
        "clear_background_image",
        state.bridge.clear_background_image(),
    )
}

// Chrome handlers

fn handle_navigate(state: &Arc<Mutex<AppState>>, url: &str) -> IpcResponse {
    info!("Navigate: {}", url);
    with_shell(state, |shell| shell.submit_url(url))
}

fn handle_new_tab(state: &Arc<Mutex<AppState>>) -> IpcResponse {
    let state = lock(state);
    let mut shell = lock(&state.shell);
    match shell.add_new_tab() {
        Some(handle) => IpcResponse::success(handle),
        None => IpcResponse::error(format!(
            "Maximum of {} tabs allowed.",
            shell.tabs().max_tabs()
        )),
    }
}

fn handle_select_tab(state: &Arc<Mutex<AppState>>, index: usize) -> IpcResponse {
    let state = lock(state);
    let mut shell = lock(&state.shell);
    if shell.select_tab(index) {
        IpcResponse::success(shell.toolbar())
    } else {
        IpcResponse::error(format!("No tab at index {}", index))
    }
}

fn handle_get_tabs(state: &Arc<Mutex<AppState>>) -> IpcResponse {
    let state = lock(state);
    let shell = lock(&state.shell);
    IpcResponse::success(shell.tabs().summaries())
}

fn handle_get_toolbar(state: &Arc<Mutex<AppState>>) -> IpcResponse {
    let state = lock(state);
    let shell = lock(&state.shell);
    IpcResponse::success(shell.toolbar())
}

fn handle_get_history(state: &Arc<Mutex<AppState>>) -> IpcResponse {
    let state = lock(state);
    let shell = lock(&state.shell);
    IpcResponse::success(shell.history().entries())
}

fn handle_get_suggestions(state: &Arc<Mutex<AppState>>, input: &str) -> IpcResponse {
    let state = lock(state);
    let shell = lock(&state.shell);
    IpcResponse::success(shell.suggestions(input))
}

fn handle_clear_history(state: &Arc<Mutex<AppState>>) -> IpcResponse {
    info!("Clearing browsing history");
    let state = lock(state);
    lock(&state.shell).clear_history();
    IpcResponse::success(json!({ "cleared": true }))
}

fn handle_shortcut(state: &Arc<Mutex<AppState>>, keys: &str) -> IpcResponse {
    let Some(action) = shortcuts::parse_accelerator(keys) else {
        return IpcResponse::error(format!("Unknown shortcut: {}", keys));
    };
    debug!("Shortcut {} -> {:?}", keys, action);

    let state = lock(state);
    let mut shell = lock(&state.shell);
    shortcuts::execute(&mut shell, action);
    IpcResponse::success(json!({
        "shortcut": action,
        "focus_url_bar": action == ShortcutAction::FocusUrlBar,
        "toolbar": shell.toolbar(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use firecat_core::BrowserConfig;
    use firecat_shell::headless::HeadlessFactory;
    use tempfile::{tempdir, TempDir};

    fn app() -> (Arc<Mutex<AppState>>, TempDir) {
        let dir = tempdir().unwrap();
        let config = BrowserConfig::with_data_dir(dir.path());
        let state = AppState::new(config, Box::new(HeadlessFactory::new())).unwrap();
        (Arc::new(Mutex::new(state)), dir)
    }

    fn send(state: &Arc<Mutex<AppState>>, raw: &str) -> IpcResponse {
        let message: IpcMessage = serde_json::from_str(raw).unwrap();
        handle_message(state, message)
    }

    fn data(response: IpcResponse) -> Value {
        match response {
            IpcResponse::Success { data } => data,
            IpcResponse::Error { message } => panic!("unexpected error: {}", message),
        }
    }

    #[test]
    fn test_navigate_from_home_opens_tab() {
        let (state, _dir) = app();
        let toolbar = data(send(&state, r#"{"cmd":"navigate","url":"example.com"}"#));
        assert_eq!(toolbar["url_text"], "https://example.com");
        assert_eq!(toolbar["home_selected"], false);

        let tabs = data(send(&state, r#"{"cmd":"get_tabs"}"#));
        assert_eq!(tabs.as_array().unwrap().len(), 2);
        assert_eq!(tabs[0]["closable"], false);
    }

    #[test]
    fn test_save_settings_accepts_text_or_object() {
        let (state, _dir) = app();
        data(send(
            &state,
            r##"{"cmd":"save_settings","settings":"{\"backgroundColor\":\"#2e2e2e\"}"}"##,
        ));
        let settings = data(send(&state, r#"{"cmd":"get_settings"}"#));
        assert_eq!(settings["mode"], "dark");

        data(send(
            &state,
            r#"{"cmd":"save_settings","settings":{"shortcuts":false}}"#,
        ));
        let settings = data(send(&state, r#"{"cmd":"get_settings"}"#));
        assert_eq!(settings["shortcuts"], false);
        assert_eq!(settings["mode"], "dark");
    }

    #[test]
    fn test_malformed_settings_is_error() {
        let (state, _dir) = app();
        let response = send(&state, r#"{"cmd":"save_settings","settings":"{oops"}"#);
        assert!(!response.is_success());
    }

    #[test]
    fn test_new_tab_limit() {
        let (state, _dir) = app();
        for _ in 1..10 {
            assert!(send(&state, r#"{"cmd":"new_tab"}"#).is_success());
        }
        match send(&state, r#"{"cmd":"new_tab"}"#) {
            IpcResponse::Error { message } => assert_eq!(message, "Maximum of 10 tabs allowed."),
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn test_shortcuts_drive_shell() {
        let (state, _dir) = app();
        send(&state, r#"{"cmd":"shortcut","keys":"Ctrl+T"}"#);
        send(&state, r#"{"cmd":"shortcut","keys":"Ctrl+T"}"#);

        let result = data(send(&state, r#"{"cmd":"shortcut","keys":"Ctrl+1"}"#));
        assert_eq!(result["toolbar"]["home_selected"], true);

        let result = data(send(&state, r#"{"cmd":"shortcut","keys":"Ctrl+L"}"#));
        assert_eq!(result["focus_url_bar"], true);

        send(&state, r#"{"cmd":"shortcut","keys":"Ctrl+Shift+Tab"}"#);
        send(&state, r#"{"cmd":"shortcut","keys":"Ctrl+W"}"#);
        let tabs = data(send(&state, r#"{"cmd":"get_tabs"}"#));
        assert_eq!(tabs.as_array().unwrap().len(), 2);

        assert!(!send(&state, r#"{"cmd":"shortcut","keys":"Ctrl+Q"}"#).is_success());
    }

    #[test]
    fn test_clear_history() {
        let (state, _dir) = app();
        send(&state, r#"{"cmd":"navigate","url":"example.com"}"#);
        lock(&lock(&state).shell).pump_engine_events();

        let history = data(send(&state, r#"{"cmd":"get_history"}"#));
        assert_eq!(history[0], "https://example.com");
        let suggestions = data(send(&state, r#"{"cmd":"get_suggestions","input":"exmpl"}"#));
        assert_eq!(suggestions[0], "https://example.com");

        send(&state, r#"{"cmd":"clear_history"}"#);
        let history = data(send(&state, r#"{"cmd":"get_history"}"#));
        assert!(history.as_array().unwrap().is_empty());
    }
}
