#![forbid(unsafe_code)]

//! Line commands typed at the shell prompt.
//!
//! Each line becomes at most one [`Msg`]. Route indices are 1-based on the
//! command line and 0-based in messages.

use std::fmt;

use postaid::search::UnknownScope;
use postaid::{LatLng, ResidentId, SearchScope};

use crate::app::{Msg, RouteAction, Tab};

pub const COMMAND_HELP: &str = "\
search <text>                      filter residents (empty clears)
scope all|building|tenant|unit     fields the search looks at
toggle <building>|<n>              expand or collapse a building
tab list|db|map                    switch view (also 1, 2, 3)
add <building> | <unit> | <tenant> add a resident
edit <id> <building> | <unit> | <tenant>
weather                            refresh the briefing
route edit                         toggle route editing
route add [label] [@lat,lng]       add a point (default: map center)
route rename <n> <label>
route move <n> <lat,lng>
route delete <n>
route pan <lat,lng>                move the map center
help, quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    Unknown(String),
    /// Right command, wrong shape.
    Usage(&'static str),
    BadNumber(String),
    BadPosition(String),
    Scope(UnknownScope),
    Tab(String),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(cmd) => write!(f, "unknown command '{cmd}' (try 'help')"),
            Self::Usage(usage) => write!(f, "usage: {usage}"),
            Self::BadNumber(s) => write!(f, "not a number: {s}"),
            Self::BadPosition(s) => write!(f, "not a position (lat,lng): {s}"),
            Self::Scope(e) => write!(f, "{e}"),
            Self::Tab(s) => write!(f, "unknown tab '{s}' (expected list, db, map)"),
        }
    }
}

impl std::error::Error for InputError {}

/// Parse one line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Msg>, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (cmd, rest) = split_word(line);
    let msg = match cmd {
        "search" | "s" => Msg::Search(rest.to_owned()),
        "scope" => Msg::Scope(rest.parse().map_err(InputError::Scope)?),
        "toggle" | "t" => {
            if rest.is_empty() {
                return Err(InputError::Usage("toggle <building>|<n>"));
            }
            Msg::Toggle(rest.to_owned())
        }
        "tab" => Msg::SwitchTab(parse_tab(rest)?),
        "1" | "2" | "3" => Msg::SwitchTab(parse_tab(cmd)?),
        "add" => {
            let [building, unit, tenant] =
                fields(rest).ok_or(InputError::Usage("add <building> | <unit> | <tenant>"))?;
            Msg::Add {
                building,
                unit,
                tenant,
            }
        }
        "edit" => {
            const USAGE: &str = "edit <id> <building> | <unit> | <tenant>";
            let (id, rest) = split_word(rest);
            if id.is_empty() {
                return Err(InputError::Usage(USAGE));
            }
            let id = ResidentId(parse_number(id.trim_start_matches('#'))?);
            let [building, unit, tenant] = fields(rest).ok_or(InputError::Usage(USAGE))?;
            Msg::Edit {
                id,
                building,
                unit,
                tenant,
            }
        }
        "weather" | "w" => Msg::RefreshWeather,
        "route" | "r" => Msg::Route(parse_route(rest)?),
        "help" | "?" => Msg::Help,
        "quit" | "exit" | "q" => Msg::Quit,
        other => return Err(InputError::Unknown(other.to_owned())),
    };
    Ok(Some(msg))
}

fn parse_route(args: &str) -> Result<RouteAction, InputError> {
    let (sub, rest) = split_word(args);
    match sub {
        "edit" => Ok(RouteAction::ToggleEdit),
        "add" => {
            let (label, at) = match rest.rfind('@') {
                Some(i) => (rest[..i].trim(), Some(parse_position(&rest[i + 1..])?)),
                None => (rest, None),
            };
            Ok(RouteAction::Add {
                label: (!label.is_empty()).then(|| label.to_owned()),
                at,
            })
        }
        "rename" => {
            let (n, label) = split_word(rest);
            if n.is_empty() || label.is_empty() {
                return Err(InputError::Usage("route rename <n> <label>"));
            }
            Ok(RouteAction::Rename {
                index: parse_index(n)?,
                label: label.to_owned(),
            })
        }
        "move" => {
            let (n, pos) = split_word(rest);
            if n.is_empty() || pos.is_empty() {
                return Err(InputError::Usage("route move <n> <lat,lng>"));
            }
            Ok(RouteAction::Move {
                index: parse_index(n)?,
                to: parse_position(pos)?,
            })
        }
        "delete" | "del" => {
            if rest.is_empty() {
                return Err(InputError::Usage("route delete <n>"));
            }
            Ok(RouteAction::Delete {
                index: parse_index(rest)?,
            })
        }
        "pan" => Ok(RouteAction::Pan(parse_position(rest)?)),
        _ => Err(InputError::Usage("route edit|add|rename|move|delete|pan ...")),
    }
}

fn parse_tab(s: &str) -> Result<Tab, InputError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "list" | "1" => Ok(Tab::List),
        "db" | "database" | "2" => Ok(Tab::Database),
        "map" | "route" | "3" => Ok(Tab::Map),
        _ => Err(InputError::Tab(s.trim().to_owned())),
    }
}

/// First whitespace-separated word and the trimmed remainder.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (s, ""),
    }
}

/// Exactly three `|`-separated fields. Blank fields pass through; the store
/// boundary rejects them.
fn fields(s: &str) -> Option<[String; 3]> {
    let mut parts = s.split('|').map(|p| p.trim().to_owned());
    let fields = [parts.next()?, parts.next()?, parts.next()?];
    parts.next().is_none().then_some(fields)
}

fn parse_number(s: &str) -> Result<u64, InputError> {
    s.parse().map_err(|_| InputError::BadNumber(s.to_owned()))
}

/// 1-based on the command line, 0-based in the message. `0` maps past the
/// end so the editor ignores it.
fn parse_index(s: &str) -> Result<usize, InputError> {
    let n: usize = s.parse().map_err(|_| InputError::BadNumber(s.to_owned()))?;
    Ok(n.checked_sub(1).unwrap_or(usize::MAX))
}

fn parse_position(s: &str) -> Result<LatLng, InputError> {
    let bad = || InputError::BadPosition(s.trim().to_owned());
    let (lat, lng) = s.split_once(',').ok_or_else(bad)?;
    let lat: f64 = lat.trim().parse().map_err(|_| bad())?;
    let lng: f64 = lng.trim().parse().map_err(|_| bad())?;
    let position = LatLng::new(lat, lng);
    position.is_valid().then_some(position).ok_or_else(bad)
}
