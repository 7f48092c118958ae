//! The levels file: a `Levels { Flags { "<capability>" "<letter>" } }`
//! document assigning letters to admin capabilities.
//!
//! Any syntax or semantic error discards the whole file and the default
//! letter table is used instead.

use std::fs;
use std::path::Path;

use tracing::{error, info, warn};

use super::keyvalues::{self, Event};
use crate::error::Error;
use crate::types::{AdminFlag, FlagLetters};

/// Result of reading a levels file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelsFile {
    pub letters: FlagLetters,
    /// Set when the file could not be used and the defaults were loaded.
    pub used_defaults: bool,
}

impl LevelsFile {
    fn defaults() -> Self {
        Self {
            letters: FlagLetters::default(),
            used_defaults: true,
        }
    }
}

/// Collects errors for one parse pass, logging the file banner only once.
struct ParseReport<'a> {
    file: &'a str,
    errors: usize,
}

impl<'a> ParseReport<'a> {
    fn new(file: &'a str) -> Self {
        Self { file, errors: 0 }
    }

    fn error(&mut self, line: usize, message: &str) {
        if self.errors == 0 {
            error!("Error(s) detected parsing {}", self.file);
        }
        error!("(line {}): {}", line, message);
        self.errors += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Root,
    Levels,
    Flags,
    Ignored,
}

/// Reads the levels file at `path`. A missing or unreadable file falls back
/// to the defaults.
pub fn load_flag_letters(path: &Path) -> LevelsFile {
    let file = path.display().to_string();
    match fs::read_to_string(path) {
        Ok(text) => parse_flag_letters(&text, &file),
        Err(e) => {
            warn!("Could not read {}: {}; using default flag letters", file, e);
            LevelsFile::defaults()
        }
    }
}

/// Parses levels-file text. `file` only names the source in log output.
pub fn parse_flag_letters(text: &str, file: &str) -> LevelsFile {
    let mut report = ParseReport::new(file);

    let events = match keyvalues::parse(text) {
        Ok(events) => events,
        Err(Error::Parse { line, message }) => {
            report.error(line, &message);
            return fallback(file);
        }
        Err(e) => {
            report.error(0, &e.to_string());
            return fallback(file);
        }
    };

    let mut letters = FlagLetters::empty();
    let mut scopes = vec![Scope::Root];
    let mut seen_flags = false;

    for event in events {
        let scope = scopes.last().copied().unwrap_or(Scope::Root);
        match event {
            Event::EnterSection { name, line } => {
                let next = match scope {
                    Scope::Root if name.eq_ignore_ascii_case("Levels") => Scope::Levels,
                    Scope::Levels if name.eq_ignore_ascii_case("Flags") && !seen_flags => {
                        seen_flags = true;
                        Scope::Flags
                    }
                    Scope::Ignored => Scope::Ignored,
                    _ => {
                        warn!("{} (line {}): ignoring section \"{}\"", file, line, name);
                        Scope::Ignored
                    }
                };
                scopes.push(next);
            }
            Event::LeaveSection { .. } => {
                scopes.pop();
            }
            Event::KeyValue { key, value, line } => match scope {
                Scope::Flags => {
                    let Some(flag) = AdminFlag::from_name(&key) else {
                        report.error(line, &format!("unrecognized admin flag \"{key}\""));
                        continue;
                    };
                    let mut chars = value.chars();
                    let letter = match (chars.next(), chars.next()) {
                        (Some(letter), None) if letter.is_ascii_lowercase() => letter,
                        _ => {
                            report.error(
                                line,
                                &format!("invalid letter \"{value}\" for flag \"{key}\""),
                            );
                            continue;
                        }
                    };
                    letters.assign(letter, flag);
                }
                Scope::Ignored => {}
                _ => warn!("{} (line {}): ignoring key \"{}\"", file, line, key),
            },
        }
    }

    if !seen_flags {
        report.error(1, "no Levels/Flags section found");
    }
    if report.errors > 0 {
        return fallback(file);
    }

    info!("Loaded flag letters from {}", file);
    LevelsFile {
        letters,
        used_defaults: false,
    }
}

fn fallback(file: &str) -> LevelsFile {
    warn!("Using default flag letters in place of {}", file);
    LevelsFile::defaults()
}
