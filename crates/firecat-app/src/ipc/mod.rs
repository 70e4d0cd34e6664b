//! IPC (Inter-Process Communication) module for Firecat
//!
//! Messages arrive as JSON objects tagged with `cmd`. The home page uses
//! the settings commands; the chrome uses the navigation and tab commands.

pub mod commands;

use serde::{Deserialize, Serialize};

/// IPC message from the page or chrome to Rust
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum IpcMessage {
    // Home page bridge
    OpenLink {
        url: String,
    },
    Search {
        query: String,
    },
    /// `settings` is either the JSON text the page built or an object
    SaveSettings {
        settings: serde_json::Value,
    },
    ResetSettings,
    GetSettings,
    ChangeBackground {
        color: String,
    },
    SetMode {
        mode: String,
    },
    SetBackgroundImage {
        path: String,
    },
    ClearBackgroundImage,

    // Navigation
    Navigate {
        url: String,
    },
    GoBack,
    GoForward,
    Reload,
    GoHome,

    // Tab management
    NewTab,
    CloseTab {
        index: usize,
    },
    SelectTab {
        index: usize,
    },
    NextTab,
    PreviousTab,
    GetTabs,
    GetToolbar,

    // History
    GetHistory,
    GetSuggestions {
        input: String,
    },
    ClearHistory,

    // Keyboard
    Shortcut {
        keys: String,
    },
}

/// IPC response to the caller
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpcResponse {
    Success { data: serde_json::Value },
    Error { message: String },
}

impl IpcResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        IpcResponse::Success {
            data: serde_json::to_value(data).unwrap_or(serde_json::Value::Null),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        IpcResponse::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, IpcResponse::Success { .. })
    }
}

/// Script injected into the home page. Exposes the bridge operations and
/// the single entry point native code uses to restyle the page.
pub const JS_BRIDGE: &str = r#"
(function() {
    const post = (msg) => window.ipc.postMessage(JSON.stringify(msg));

    window.firecat = {
        // Settings bridge
        openLink: (url) => post({ cmd: 'open_link', url }),
        search: (query) => post({ cmd: 'search', query }),
        saveSettings: (settings) => post({ cmd: 'save_settings', settings }),
        resetSettings: () => post({ cmd: 'reset_settings' }),
        getSettings: () => post({ cmd: 'get_settings' }),
        changeBackground: (color) => post({ cmd: 'change_background', color }),
        setMode: (mode) => post({ cmd: 'set_mode', mode }),

        applyVisualState: (state) => {
            const body = document.body;
            if (!body) return;
            if (state.backgroundColor) body.style.backgroundColor = state.backgroundColor;
            if (state.textColor) body.style.color = state.textColor;
            if (state.modeClass) {
                body.classList.remove('light-mode', 'dark-mode', 'custom-mode');
                body.classList.add(state.modeClass);
            }
            const searchBar = document.querySelector('.search-bar');
            if (searchBar && state.searchBarColor) {
                searchBar.style.backgroundColor = state.searchBarColor;
                if (state.textColor) searchBar.style.color = state.textColor;
            }
            if (state.shortcutColor) {
                document.querySelectorAll('.shortcut').forEach((el) => {
                    el.style.backgroundColor = state.shortcutColor;
                });
            }
            if (state.recomputeContrast && typeof window.updateTextContrast === 'function') {
                window.updateTextContrast();
            }
        },
    };
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bridge_messages() {
        let msg: IpcMessage =
            serde_json::from_str(r#"{"cmd":"open_link","url":"example.com"}"#).unwrap();
        assert!(matches!(msg, IpcMessage::OpenLink { url } if url == "example.com"));

        let msg: IpcMessage = serde_json::from_str(
            r##"{"cmd":"save_settings","settings":"{\"backgroundColor\":\"#000000\"}"}"##,
        )
        .unwrap();
        assert!(matches!(msg, IpcMessage::SaveSettings { settings } if settings.is_string()));

        let msg: IpcMessage = serde_json::from_str(r#"{"cmd":"reset_settings"}"#).unwrap();
        assert!(matches!(msg, IpcMessage::ResetSettings));
    }

    #[test]
    fn test_parse_chrome_messages() {
        let msg: IpcMessage = serde_json::from_str(r#"{"cmd":"close_tab","index":2}"#).unwrap();
        assert!(matches!(msg, IpcMessage::CloseTab { index: 2 }));

        let msg: IpcMessage =
            serde_json::from_str(r#"{"cmd":"shortcut","keys":"Ctrl+Shift+Tab"}"#).unwrap();
        assert!(matches!(msg, IpcMessage::Shortcut { keys } if keys == "Ctrl+Shift+Tab"));

        assert!(serde_json::from_str::<IpcMessage>(r#"{"cmd":"launch_rockets"}"#).is_err());
    }

    #[test]
    fn test_response_shape() {
        let json = serde_json::to_value(IpcResponse::error("nope")).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "nope");

        let json = serde_json::to_value(IpcResponse::success(vec![1, 2])).unwrap();
        assert_eq!(json["type"], "success");
        assert_eq!(json["data"][1], 2);
    }
}
