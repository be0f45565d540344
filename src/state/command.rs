//! Command-string formatting for the display backend.
//!
//! Commands are plain text: an animation name with its parameters, followed
//! by one `on <cell>` clause per addressed cell.

use std::collections::BTreeMap;

use super::catalog::Animation;
use super::preset::{Preset, Theme};
use super::selection::Selection;

/// Shortest decimal form: `1`, `0.5`, `-0.25`
pub fn format_number(v: f64) -> String {
    format!("{}", v)
}

/// Animation command without the `display` prefix or cell clauses
pub fn animation_command(anim: &Animation, preset: &Preset) -> String {
    let mut command = anim.id.clone();
    if let Some(suffix) = &anim.suffix {
        command.push(' ');
        command.push_str(suffix);
    }
    for slider in &anim.sliders {
        let value = preset.sliders.get(&slider.name).copied().unwrap_or(slider.default);
        command.push_str(&format!(" {} {}", slider.name, format_number(value)));
    }
    for e in &anim.enums {
        // Unset enums are left out entirely
        let Some(option) = preset.enums.get(&e.name) else {
            continue;
        };
        if let Some(keyword) = &e.command {
            command.push(' ');
            command.push_str(keyword);
        }
        command.push(' ');
        command.push_str(option);
    }
    command
}

pub fn display_command(command: &str, selection: &Selection) -> String {
    format!("display {}{}", command, selection.selector())
}

pub fn brightness_command(value: f64, selection: &Selection) -> String {
    format!("brightness {}{}", format_number(value), selection.selector())
}

/// Commands that apply a theme to the active cells.
///
/// Cells sharing a command are addressed by a single command. Returns the
/// commands in first-seen order together with the per-cell commands that
/// were applied.
pub fn theme_commands(theme: &Theme, selection: &Selection) -> (Vec<String>, BTreeMap<String, String>) {
    let mut groups: Vec<(String, String)> = Vec::new();
    let mut applied = BTreeMap::new();
    for (cell, cmd) in theme {
        if !selection.is_active(cell) {
            continue;
        }
        match groups.iter_mut().find(|(c, _)| c == cmd) {
            Some((_, text)) => text.push_str(&format!(" on {}", cell)),
            None => groups.push((cmd.clone(), format!("{} on {}", cmd, cell))),
        }
        applied.insert(cell.clone(), cmd.clone());
    }
    let commands = groups
        .into_iter()
        .map(|(_, text)| format!("display {}", text))
        .collect();
    (commands, applied)
}
