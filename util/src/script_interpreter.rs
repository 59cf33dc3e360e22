//! # Intent script interpreter module
//!
//! This module provides an interpreter for car intent scripts, allowing
//! intents to be replayed at fixed cycles. A script is a list of
//! `<cycle>: <json intent>;` entries, for example:
//!
//! ```text
//! 0:  {"Speed": {"speed_pct": 40}};
//! 5:  {"Drive": "Forward"};
//! 50: "Stop";
//! ```
//!
//! Timing is in cycles rather than seconds so that a replay is deterministic.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use comms_if::intent::{Intent, IntentParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An intent which is scripted to occur at a specific cycle.
#[derive(Debug)]
struct ScriptedIntent {
    /// The cycle the intent is supposed to execute on
    exec_cycle: u64,

    /// The intent to apply
    intent: Intent
}

/// A script interpreter.
///
/// After initialising with the script use `.get_pending_intents` each cycle
/// to acquire the intents that need applying.
#[derive(Debug)]
pub struct ScriptInterpreter {
    script_path: Option<PathBuf>,
    intents: VecDeque<ScriptedIntent>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error("Script contains an invalid cycle number: {0}")]
    InvalidCycle(String),

    #[error("Script contains an invalid intent at cycle {0}: {1}")]
    InvalidIntent(u64, IntentParseError)
}

#[derive(Debug, PartialEq)]
pub enum PendingIntents {
    None,
    Some(Vec<Intent>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = PathBuf::from(script_path.as_ref());

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        let script = fs::read_to_string(&path)
            .map_err(ScriptError::ScriptLoadError)?;

        let mut si = Self::from_script_str(&script)?;
        si.script_path = Some(path);

        Ok(si)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_script_str(script: &str) -> Result<Self, ScriptError> {
        let mut queue: VecDeque<ScriptedIntent> = VecDeque::new();

        // The pattern is a literal so building it cannot fail
        let re = RegexBuilder::new(r"^\s*(\d+)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("Script pattern is invalid");

        for cap in re.captures_iter(script) {
            let exec_cycle: u64 = cap[1]
                .parse()
                .map_err(|e| ScriptError::InvalidCycle(format!("{}", e)))?;

            let intent = Intent::from_json(cap[2].trim())
                .map_err(|e| ScriptError::InvalidIntent(exec_cycle, e))?;

            queue.push_back(ScriptedIntent {
                exec_cycle,
                intent
            });
        }

        if queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        // Entries may be written out of order, execution must not be
        queue
            .make_contiguous()
            .sort_by_key(|s| s.exec_cycle);

        Ok(ScriptInterpreter {
            script_path: None,
            intents: queue
        })
    }

    /// Return the intents which are due on the given cycle.
    ///
    /// Any intent scheduled for this cycle or earlier is returned, so a late
    /// call never drops intents.
    pub fn get_pending_intents(&mut self, cycle: u64) -> PendingIntents {

        // If the queue is empty the script is over
        if self.intents.is_empty() {
            return PendingIntents::EndOfScript
        }

        let mut due: Vec<Intent> = vec![];

        while let Some(front) = self.intents.front() {
            if front.exec_cycle > cycle {
                break;
            }

            if let Some(s) = self.intents.pop_front() {
                due.push(s.intent);
            }
        }

        if due.is_empty() {
            PendingIntents::None
        }
        else {
            PendingIntents::Some(due)
        }
    }

    /// Get the number of intents remaining in the script
    pub fn get_num_intents(&self) -> usize {
        self.intents.len()
    }

    /// Get the length of the script in cycles
    pub fn get_duration(&self) -> u64 {
        self.intents.back().map(|s| s.exec_cycle).unwrap_or(0)
    }

    /// Get the path the script was loaded from, if it came from a file.
    pub fn script_path(&self) -> Option<&Path> {
        self.script_path.as_deref()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::intent::Direction;

    #[test]
    fn test_pending_intents() {
        let mut si = ScriptInterpreter::from_script_str(
            "5: {\"Drive\": \"Forward\"};\n\
             0: {\"Speed\": {\"speed_pct\": 40}};\n\
             5: \"Stop\";\n"
        ).unwrap();

        assert_eq!(si.get_num_intents(), 3);
        assert_eq!(si.get_duration(), 5);

        assert_eq!(
            si.get_pending_intents(0),
            PendingIntents::Some(vec![Intent::Speed { speed_pct: 40 }])
        );
        assert_eq!(si.get_pending_intents(4), PendingIntents::None);
        assert_eq!(
            si.get_pending_intents(7),
            PendingIntents::Some(vec![Intent::Drive(Direction::Forward), Intent::Stop])
        );
        assert_eq!(si.get_pending_intents(8), PendingIntents::EndOfScript);
    }

    #[test]
    fn test_bad_scripts() {
        assert!(matches!(
            ScriptInterpreter::from_script_str("nothing to see here"),
            Err(ScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            ScriptInterpreter::from_script_str("3: {\"Drive\": \"Up\"};"),
            Err(ScriptError::InvalidIntent(3, _))
        ));
        assert!(matches!(
            ScriptInterpreter::new("/definitely/not/a/script.txt"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}
