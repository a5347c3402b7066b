use dialoguer::{theme::ColorfulTheme, Password};
use indicatif::{ProgressBar, ProgressStyle};
use strum::EnumProperty;
use strum_macros::EnumProperty;

#[derive(EnumProperty, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputColor {
    #[strum(props(Ansi = "32"))]
    Green,

    #[strum(props(Ansi = "33"))]
    Yellow,

    #[strum(props(Ansi = "31"))]
    Red,
}

/// Right-aligns `text` in a bold colored column, cargo style.
pub fn get_formatted_left_output(text: &str, color: &OutputColor) -> String {
    let code = color.get_str("Ansi").unwrap_or("0");
    format!("\x1b[1;{code}m{text:>12}\x1b[0m")
}

pub fn create_new_pb(len: u64, prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("{prefix:>12.cyan.bold} [{bar:25}] {pos}/{len}{msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb.set_prefix(prefix.to_string());
    pb
}

pub fn prompt_password_input(prompt: &str) -> String {
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_and_colors_status_word() {
        assert_eq!(
            get_formatted_left_output("Synced", &OutputColor::Green),
            "\x1b[1;32m      Synced\x1b[0m"
        );
        assert!(get_formatted_left_output("Error", &OutputColor::Red).starts_with("\x1b[1;31m"));
    }
}
