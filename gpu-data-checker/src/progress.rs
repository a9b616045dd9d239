//! Barre de progression du contrôle

use std::io::IsTerminal;

use gpu_check::Progress;
use indicatif::{ProgressBar, ProgressStyle};

/// Barre de progression alimentée par les ticks du moteur
///
/// Masquée en mode silencieux ou lorsque stderr n'est pas un terminal.
pub struct CheckProgress {
    bar: ProgressBar,
}

impl CheckProgress {
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet || !std::io::stderr().is_terminal() {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(0);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} Contrôle [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
            {
                bar.set_style(style.progress_chars("█▓░"));
            }
            bar
        };
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Progress for CheckProgress {
    fn on_tick(&mut self, current: usize, total: usize) {
        if self.bar.length() != Some(total as u64) {
            self.bar.set_length(total as u64);
        }
        self.bar.set_position(current as u64);
    }
}
