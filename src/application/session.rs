//! Interactive progression loop.
//!
//! Walks the operator through the device list one entry at a time. The
//! cursor is written to the progress store after every change so an
//! interrupted run resumes at the last decision taken.

use std::io::{self, BufRead, Write};

use colored::Colorize;

use crate::domain::{AppError, DeviceRecord, Result};
use crate::infrastructure::{Configurator, ProgressStore};

use super::formatter::format_device_card;

const MAIN_PROMPT: &str = "Apply configuration? (y)es/(n)ext/(b)ack/(j)ump/(q)uit:";

/// Operator command read at the main prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Apply,
    Skip,
    Back,
    Jump,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parse a raw line. Case and surrounding whitespace are ignored;
    /// anything starting with `j` is a jump.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let input = input.trim().to_lowercase();
        match input.as_str() {
            "y" => Self::Apply,
            "n" => Self::Skip,
            "b" => Self::Back,
            "q" => Self::Quit,
            s if s.starts_with('j') => Self::Jump,
            _ => Self::Unknown(input),
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Every device has been handled.
    Complete,
    /// The operator quit (or the console closed).
    Quit,
}

/// One pass over the device list, resuming from the stored cursor.
pub struct Session<'a, C: Configurator> {
    devices: &'a [DeviceRecord],
    store: &'a ProgressStore,
    configurator: &'a C,
    cursor: usize,
}

impl<'a, C: Configurator> Session<'a, C> {
    /// Create a session positioned at the stored cursor.
    ///
    /// A stored cursor past the end of the list is clamped to its length
    /// and the clamped value written back.
    pub fn new(devices: &'a [DeviceRecord], store: &'a ProgressStore, configurator: &'a C) -> Self {
        let stored = store.load();
        let cursor = stored.min(devices.len());
        if cursor != stored {
            tracing::debug!(stored, len = devices.len(), "Stored cursor beyond device list");
            if let Err(e) = store.save(cursor) {
                tracing::warn!(cursor, "Progress not saved: {}", e);
            }
        }

        Self {
            devices,
            store,
            configurator,
            cursor,
        }
    }

    /// Index of the next device to process.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Run until the list is exhausted or the operator quits.
    ///
    /// # Errors
    /// Returns error only if the console cannot be read or written.
    pub fn run(&mut self, input: impl BufRead, output: impl Write) -> Result<SessionEnd> {
        self.drive(input, output)
            .map_err(|e| AppError::io("Console I/O failed", e))
    }

    fn drive(&mut self, mut input: impl BufRead, mut out: impl Write) -> io::Result<SessionEnd> {
        let devices = self.devices;
        let total = devices.len();

        writeln!(out, "Loaded {total} servers")?;
        if self.cursor > 0 && self.cursor < total {
            writeln!(out, "Resuming at position {}", self.cursor + 1)?;
        }

        while self.cursor < total {
            let device = &devices[self.cursor];
            writeln!(out, "{}", format_device_card(self.cursor, total, device))?;

            let Some(line) = prompt(&mut input, &mut out, MAIN_PROMPT)? else {
                writeln!(out)?;
                return self.quit(&mut out);
            };

            match Command::parse(&line) {
                Command::Apply => self.apply_current(device, &mut input, &mut out)?,
                Command::Skip => self.move_to(self.cursor + 1, &mut out)?,
                Command::Back => {
                    if self.cursor > 0 {
                        self.move_to(self.cursor - 1, &mut out)?;
                    }
                }
                Command::Jump => self.jump(&mut input, &mut out)?,
                Command::Quit => return self.quit(&mut out),
                Command::Unknown(other) => {
                    tracing::debug!(input = %other, "Unrecognized command");
                    writeln!(
                        out,
                        "{}",
                        "Unrecognized command, available commands: y/n/b/j/q".yellow()
                    )?;
                }
            }
        }

        writeln!(out, "\n{}", "All servers processed".green().bold())?;
        Ok(SessionEnd::Complete)
    }

    fn apply_current(
        &mut self,
        device: &DeviceRecord,
        input: &mut impl BufRead,
        out: &mut impl Write,
    ) -> io::Result<()> {
        writeln!(out, "Configuring...")?;

        if self.configurator.apply(device).is_success() {
            writeln!(out, "{}", "✅ Configuration applied".green())?;
            return self.move_to(self.cursor + 1, out);
        }

        writeln!(out, "{}", "❌ Configuration failed, check the audit log".red())?;

        let retry = prompt(input, out, "Retry? (y/n):")?;
        if retry.as_deref() == Some("y") {
            return Ok(());
        }

        self.move_to(self.cursor + 1, out)
    }

    fn jump(&mut self, input: &mut impl BufRead, out: &mut impl Write) -> io::Result<()> {
        let total = self.devices.len();
        let Some(target) = prompt(input, out, &format!("Target position (1-{total}):"))? else {
            return Ok(());
        };

        let Ok(position) = target.parse::<i64>() else {
            return writeln!(out, "{}", "Invalid input".yellow());
        };

        match usize::try_from(position) {
            Ok(position) if (1..=total).contains(&position) => self.move_to(position - 1, out),
            _ => writeln!(out, "{}", "Invalid position range".yellow()),
        }
    }

    fn quit(&self, out: &mut impl Write) -> io::Result<SessionEnd> {
        self.persist(out)?;
        writeln!(out, "Exiting")?;
        Ok(SessionEnd::Quit)
    }

    fn move_to(&mut self, cursor: usize, out: &mut impl Write) -> io::Result<()> {
        tracing::info!(from = self.cursor, to = cursor, "Cursor moved");
        self.cursor = cursor;
        self.persist(out)
    }

    fn persist(&self, out: &mut impl Write) -> io::Result<()> {
        if let Err(e) = self.store.save(self.cursor) {
            tracing::warn!(cursor = self.cursor, "Progress not saved: {}", e);
            writeln!(out, "{} {e}", "Warning:".yellow().bold())?;
        }
        Ok(())
    }
}

/// Print `message`, then read one trimmed, lowercased line.
/// Returns `None` at end of input.
fn prompt(
    input: &mut impl BufRead,
    out: &mut impl Write,
    message: &str,
) -> io::Result<Option<String>> {
    write!(out, "{message} ")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io::Cursor;

    use tempfile::{tempdir, TempDir};

    use crate::domain::{ApplyOutcome, FailureKind};

    /// Records every device it is asked to configure and replays scripted
    /// outcomes (success once the script runs out).
    #[derive(Default)]
    struct FakeConfigurator {
        applied: RefCell<Vec<String>>,
        outcomes: RefCell<VecDeque<bool>>,
    }

    impl FakeConfigurator {
        fn scripted(outcomes: &[bool]) -> Self {
            Self {
                applied: RefCell::default(),
                outcomes: RefCell::new(outcomes.iter().copied().collect()),
            }
        }

        fn applied(&self) -> Vec<String> {
            self.applied.borrow().clone()
        }
    }

    impl Configurator for FakeConfigurator {
        fn apply(&self, device: &DeviceRecord) -> ApplyOutcome {
            self.applied.borrow_mut().push(device.location.clone());
            if self.outcomes.borrow_mut().pop_front().unwrap_or(true) {
                ApplyOutcome::Success
            } else {
                ApplyOutcome::failure(FailureKind::ToolRejected, "rejected")
            }
        }
    }

    fn devices(n: usize) -> Vec<DeviceRecord> {
        (1..=n)
            .map(|i| DeviceRecord {
                location: format!("dev{i}"),
                current_ip: format!("192.168.1.{i}"),
                ip: format!("10.0.0.{i}"),
                netmask: "255.255.255.0".into(),
                gateway: "10.0.0.254".into(),
            })
            .collect()
    }

    fn store(dir: &TempDir) -> ProgressStore {
        ProgressStore::new(dir.path().join("progress.state"))
    }

    fn run(
        devices: &[DeviceRecord],
        store: &ProgressStore,
        configurator: &FakeConfigurator,
        script: &str,
    ) -> (SessionEnd, usize, String) {
        let mut session = Session::new(devices, store, configurator);
        let mut out = Vec::new();
        let end = session.run(Cursor::new(script), &mut out).unwrap();
        (end, session.cursor(), String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("y"), Command::Apply);
        assert_eq!(Command::parse(" Y \n"), Command::Apply);
        assert_eq!(Command::parse("n"), Command::Skip);
        assert_eq!(Command::parse("b"), Command::Back);
        assert_eq!(Command::parse("j"), Command::Jump);
        assert_eq!(Command::parse("jump"), Command::Jump);
        assert_eq!(Command::parse("q"), Command::Quit);
        assert_eq!(Command::parse("yes"), Command::Unknown("yes".into()));
        assert_eq!(Command::parse(""), Command::Unknown(String::new()));
    }

    #[test]
    fn test_skip_apply_quit() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        let list = devices(3);
        let fake = FakeConfigurator::default();

        let (end, cursor, _) = run(&list, &store, &fake, "n\ny\nq\n");

        assert_eq!(end, SessionEnd::Quit);
        assert_eq!(cursor, 2);
        assert_eq!(store.load(), 2);
        assert_eq!(fake.applied(), ["dev2"]);
    }

    #[test]
    fn test_back_floors_at_zero_then_jump() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        store.save(1).unwrap();
        let list = devices(3);
        let fake = FakeConfigurator::default();

        let (_, cursor, out) = run(&list, &store, &fake, "b\nb\nj\n1\nq\n");

        assert_eq!(cursor, 0);
        assert_eq!(store.load(), 0);
        assert!(out.contains("Resuming at position 2"));
        assert!(!out.contains("Invalid"));
        assert!(!out.contains("Unrecognized"));
        assert!(fake.applied().is_empty());
    }

    #[test]
    fn test_jump_to_last_position() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        let list = devices(3);
        let fake = FakeConfigurator::default();

        let (_, cursor, out) = run(&list, &store, &fake, "jump\n3\nq\n");

        assert_eq!(cursor, 2);
        assert_eq!(store.load(), 2);
        assert!(out.contains("Target position (1-3):"));
    }

    #[test]
    fn test_jump_out_of_range_leaves_cursor() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        store.save(1).unwrap();
        let list = devices(3);
        let fake = FakeConfigurator::default();

        let (_, cursor, out) = run(&list, &store, &fake, "j\n0\nj\n4\nq\n");

        assert_eq!(cursor, 1);
        assert_eq!(store.load(), 1);
        assert_eq!(out.matches("Invalid position range").count(), 2);
    }

    #[test]
    fn test_jump_negative_is_out_of_range() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        store.save(2).unwrap();
        let list = devices(3);
        let fake = FakeConfigurator::default();

        let (_, cursor, out) = run(&list, &store, &fake, "j\n-1\nq\n");

        assert_eq!(cursor, 2);
        assert_eq!(store.load(), 2);
        assert!(out.contains("Invalid position range"));
        assert!(!out.contains("Invalid input"));
    }

    #[test]
    fn test_jump_non_numeric_leaves_cursor() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        let list = devices(3);
        let fake = FakeConfigurator::default();

        let (_, cursor, out) = run(&list, &store, &fake, "j\nabc\nq\n");

        assert_eq!(cursor, 0);
        assert!(out.contains("Invalid input"));
    }

    #[test]
    fn test_failed_apply_retry_reattempts_same_device() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        let list = devices(2);
        let fake = FakeConfigurator::scripted(&[false, true]);

        let (_, cursor, out) = run(&list, &store, &fake, "y\ny\ny\nq\n");

        assert_eq!(fake.applied(), ["dev1", "dev1"]);
        assert_eq!(cursor, 1);
        assert_eq!(store.load(), 1);
        assert!(out.contains("Configuration failed"));
        assert!(out.contains("Retry? (y/n):"));
    }

    #[test]
    fn test_failed_apply_declined_retry_moves_on() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        let list = devices(3);
        let fake = FakeConfigurator::scripted(&[false]);

        let (_, cursor, _) = run(&list, &store, &fake, "y\nn\nq\n");

        assert_eq!(fake.applied(), ["dev1"]);
        assert_eq!(cursor, 1);
        assert_eq!(store.load(), 1);
    }

    #[test]
    fn test_unknown_command_changes_nothing() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        let list = devices(2);
        let fake = FakeConfigurator::default();

        let (_, cursor, out) = run(&list, &store, &fake, "x\nq\n");

        assert_eq!(cursor, 0);
        assert!(out.contains("Unrecognized command"));
        assert!(out.contains("y/n/b/j/q"));
    }

    #[test]
    fn test_runs_to_completion() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        let list = devices(2);
        let fake = FakeConfigurator::default();

        let (end, cursor, out) = run(&list, &store, &fake, "y\nn\n");

        assert_eq!(end, SessionEnd::Complete);
        assert_eq!(cursor, 2);
        assert_eq!(store.load(), 2);
        assert!(out.contains("All servers processed"));
    }

    #[test]
    fn test_end_of_input_quits_and_persists() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        let list = devices(3);
        let fake = FakeConfigurator::default();

        let (end, cursor, _) = run(&list, &store, &fake, "n\n");

        assert_eq!(end, SessionEnd::Quit);
        assert_eq!(cursor, 1);
        assert_eq!(store.load(), 1);
    }

    #[test]
    fn test_stored_cursor_past_end_is_clamped() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        store.save(10).unwrap();
        let list = devices(3);
        let fake = FakeConfigurator::default();

        let (end, cursor, _) = run(&list, &store, &fake, "");

        assert_eq!(end, SessionEnd::Complete);
        assert_eq!(cursor, 3);
        assert_eq!(store.load(), 3);
    }

    #[test]
    fn test_empty_list_completes_immediately() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        let fake = FakeConfigurator::default();

        let (end, cursor, out) = run(&[], &store, &fake, "");

        assert_eq!(end, SessionEnd::Complete);
        assert_eq!(cursor, 0);
        assert!(out.contains("Loaded 0 servers"));
    }
}
