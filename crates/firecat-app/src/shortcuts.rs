//! Keyboard accelerators

use firecat_shell::BrowserShell;
use serde::Serialize;

/// What a keyboard accelerator does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "index", rename_all = "snake_case")]
pub enum ShortcutAction {
    NewTab,
    CloseTab,
    Reload,
    FocusUrlBar,
    Back,
    Forward,
    NextTab,
    PreviousTab,
    /// Zero-based tab position
    GoToTab(usize),
}

/// Accelerators and their actions, for display
pub const SHORTCUTS: &[(&str, ShortcutAction)] = &[
    ("Ctrl+T", ShortcutAction::NewTab),
    ("Ctrl+W", ShortcutAction::CloseTab),
    ("F5", ShortcutAction::Reload),
    ("Ctrl+R", ShortcutAction::Reload),
    ("Ctrl+L", ShortcutAction::FocusUrlBar),
    ("Alt+Left", ShortcutAction::Back),
    ("Alt+Right", ShortcutAction::Forward),
    ("Ctrl+Tab", ShortcutAction::NextTab),
    ("Ctrl+Shift+Tab", ShortcutAction::PreviousTab),
];

/// Parse an accelerator like `"Ctrl+Shift+Tab"`.
///
/// Matching ignores case and modifier order.
pub fn parse_accelerator(keys: &str) -> Option<ShortcutAction> {
    let mut ctrl = false;
    let mut shift = false;
    let mut alt = false;
    let mut key = None;

    for part in keys.split('+').map(|p| p.trim().to_ascii_lowercase()) {
        match part.as_str() {
            "ctrl" | "control" => ctrl = true,
            "shift" => shift = true,
            "alt" => alt = true,
            "" => return None,
            _ => {
                if key.is_some() {
                    return None;
                }
                key = Some(part);
            }
        }
    }

    let key = key?;
    let action = match (ctrl, shift, alt, key.as_str()) {
        (true, false, false, "t") => ShortcutAction::NewTab,
        (true, false, false, "w") => ShortcutAction::CloseTab,
        (true, false, false, "r") | (false, false, false, "f5") => ShortcutAction::Reload,
        (true, false, false, "l") => ShortcutAction::FocusUrlBar,
        (false, false, true, "left") => ShortcutAction::Back,
        (false, false, true, "right") => ShortcutAction::Forward,
        (true, false, false, "tab") => ShortcutAction::NextTab,
        (true, true, false, "tab") => ShortcutAction::PreviousTab,
        (true, false, false, digit) => {
            let n: usize = digit.parse().ok()?;
            if !(1..=9).contains(&n) {
                return None;
            }
            ShortcutAction::GoToTab(n - 1)
        }
        _ => return None,
    };
    Some(action)
}

/// Carry out an action on the shell.
///
/// Focusing the URL bar is left to the chrome.
pub fn execute(shell: &mut BrowserShell, action: ShortcutAction) {
    match action {
        ShortcutAction::NewTab => {
            shell.add_new_tab();
        }
        ShortcutAction::CloseTab => {
            shell.close_active_tab();
        }
        ShortcutAction::Reload => shell.reload(),
        ShortcutAction::FocusUrlBar => {}
        ShortcutAction::Back => shell.go_back(),
        ShortcutAction::Forward => shell.go_forward(),
        ShortcutAction::NextTab => shell.next_tab(),
        ShortcutAction::PreviousTab => shell.previous_tab(),
        ShortcutAction::GoToTab(index) => {
            shell.go_to_tab(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accelerators() {
        assert_eq!(parse_accelerator("Ctrl+T"), Some(ShortcutAction::NewTab));
        assert_eq!(parse_accelerator("ctrl+w"), Some(ShortcutAction::CloseTab));
        assert_eq!(parse_accelerator("F5"), Some(ShortcutAction::Reload));
        assert_eq!(parse_accelerator("Ctrl+R"), Some(ShortcutAction::Reload));
        assert_eq!(parse_accelerator("Alt+Left"), Some(ShortcutAction::Back));
        assert_eq!(
            parse_accelerator("Shift+Ctrl+Tab"),
            Some(ShortcutAction::PreviousTab)
        );
        assert_eq!(parse_accelerator("Ctrl+1"), Some(ShortcutAction::GoToTab(0)));
        assert_eq!(parse_accelerator("Ctrl+9"), Some(ShortcutAction::GoToTab(8)));
    }

    #[test]
    fn test_rejects_unknown() {
        assert_eq!(parse_accelerator("Ctrl+0"), None);
        assert_eq!(parse_accelerator("Ctrl+Shift+T"), None);
        assert_eq!(parse_accelerator("Ctrl+"), None);
        assert_eq!(parse_accelerator("T+W"), None);
        assert_eq!(parse_accelerator(""), None);
    }

    #[test]
    fn test_listed_shortcuts_parse() {
        for (keys, action) in SHORTCUTS {
            assert_eq!(parse_accelerator(keys), Some(*action), "{}", keys);
        }
    }
}
