use std::path::Path;

use crate::core::Blacklist;
use crate::error::InputError;
use crate::models::Preferences;

/// Parse preference lists, one person per line: `name:choice1,choice2,...`
///
/// Blank lines are skipped and names are trimmed. An empty right-hand side is an empty
/// list, which completion later fills entirely at random.
pub fn parse_preferences(text: &str) -> Result<Preferences, InputError> {
    let mut prefs = Preferences::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let line_no = index + 1;

        let Some((person, choices)) = line.split_once(':') else {
            return Err(InputError::Parse {
                line: line_no,
                reason: format!("expected 'name:choice,...', got '{}'", line),
            });
        };

        let person = person.trim();
        if person.is_empty() {
            return Err(InputError::Parse {
                line: line_no,
                reason: "missing person name".to_string(),
            });
        }

        let list: Vec<String> = choices
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();

        if prefs.insert(person.to_string(), list).is_some() {
            return Err(InputError::Parse {
                line: line_no,
                reason: format!("{} is listed twice", person),
            });
        }
    }

    Ok(prefs)
}

/// Parse a blacklist, one forbidden `woman,man` pair per line
pub fn parse_blacklist(text: &str) -> Result<Blacklist, InputError> {
    let mut blacklist = Blacklist::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(',') {
            Some((a, b)) if !a.trim().is_empty() && !b.trim().is_empty() && !b.contains(',') => {
                blacklist.insert(a.trim(), b.trim());
            }
            _ => {
                return Err(InputError::Parse {
                    line: index + 1,
                    reason: format!("expected 'woman,man', got '{}'", line),
                });
            }
        }
    }

    Ok(blacklist)
}

/// Read and parse a preferences file
pub fn read_preferences<P: AsRef<Path>>(path: P) -> Result<Preferences, InputError> {
    let text = read(path.as_ref())?;
    parse_preferences(&text)
}

/// Read and parse a blacklist file
pub fn read_blacklist<P: AsRef<Path>>(path: P) -> Result<Blacklist, InputError> {
    let text = read(path.as_ref())?;
    parse_blacklist(&text)
}

fn read(path: &Path) -> Result<String, InputError> {
    std::fs::read_to_string(path).map_err(|e| InputError::Parse {
        line: 0,
        reason: format!("cannot read {}: {}", path.display(), e),
    })
}
