//! Command grammar for decoded packet payloads.
//!
//! Every inbound payload is parsed exactly once into a closed [`Command`]
//! value; the dispatcher then matches exhaustively instead of re-testing
//! string prefixes at each step. Unrecognized input is preserved verbatim in
//! [`Command::Unknown`] so the error response can echo it back.

/// Greeting payload the server sends as its first packet on every
/// connection, before any command is read.
pub const GREETING: &[u8] = b"CONNECTED";

/// One parsed client command.
///
/// Matching rules:
/// - `UPDATE` matches case-insensitively and takes no arguments.
/// - `SET ` is an exact prefix; the remainder splits at the first `=` into a
///   name and a value, both whitespace-trimmed. A remainder without `=`
///   (including an empty remainder) is [`Command::MalformedSet`].
/// - `FILTER name=` is an exact prefix; the remainder is the trimmed
///   substring pattern, which may be empty.
/// - The `SORT` verb matches case-insensitively and must be followed by the
///   literal ` name`; trailing text after that is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Rescan the search path, persist the result, reply with the document.
    Update,
    /// Store a settings value and record the change in the audit log.
    Set { name: String, value: String },
    /// `SET` was recognized but the remainder had no `=` separator.
    MalformedSet,
    /// Reply with the persisted inventory restricted to matching executables.
    Filter { pattern: String },
    /// Reply with the persisted inventory sorted by executable name.
    Sort,
    /// Anything else; carries the trimmed original text for the error reply.
    Unknown(String),
}

impl Command {
    /// Parses one decoded payload into a [`Command`].
    ///
    /// The input is trimmed before matching, so surrounding whitespace never
    /// changes the outcome. Whitespace-only input parses to
    /// `Unknown(String::new())`; the caller decides separately what to do
    /// with a payload that was empty before trimming.
    pub fn parse(input: &str) -> Command {
        let text = input.trim();

        if text.eq_ignore_ascii_case("UPDATE") {
            return Command::Update;
        }

        if let Some(rest) = text.strip_prefix("SET ") {
            return match rest.split_once('=') {
                Some((name, value)) => Command::Set {
                    name: name.trim().to_string(),
                    value: value.trim().to_string(),
                },
                None => Command::MalformedSet,
            };
        }

        if let Some(rest) = text.strip_prefix("FILTER name=") {
            return Command::Filter {
                pattern: rest.trim().to_string(),
            };
        }

        // Byte-wise comparison keeps the case-insensitive verb check safe on
        // arbitrary (possibly non-ASCII) input.
        let bytes = text.as_bytes();
        if bytes.len() >= 9 && bytes[..4].eq_ignore_ascii_case(b"SORT") && &bytes[4..9] == b" name"
        {
            return Command::Sort;
        }

        Command::Unknown(text.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
