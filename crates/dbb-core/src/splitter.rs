//! Statement splitting for change script SQL files.
//!
//! Change script files carry several statements separated by an explicit
//! marker rather than a bare `;`, because procedure and trigger bodies
//! contain semicolons of their own. The marker depends on the file's
//! [`ContentKind`].

/// Directive some files start with; it is not SQL the target understands.
pub const DEFINE_OFF_DIRECTIVE: &str = "set define off;";

/// Delimiter between plain statements.
pub const STATEMENT_DELIMITER: &str = ";--<";

/// Delimiter between procedural blocks (procedures, triggers, large statements).
pub const BLOCK_DELIMITER: &str = "--<";

/// Rule delimiter without its line terminator.
pub const RULE_DELIMITER: &str = ";--end";

/// How a SQL file's contents are split into executable statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Plain statements split on `;--<`; a failing statement is fatal.
    Statements,
    /// Procedures, triggers, and large statements split on `--<`; fatal on failure.
    Procedural,
    /// Rule blocks split on `;--end` plus a line terminator; best effort.
    Rules,
}

impl ContentKind {
    /// Classify a file by its name.
    ///
    /// Files inside a script's rule sub-directory are always [`ContentKind::Rules`].
    pub fn from_file_name(file_name: &str, in_rule_dir: bool) -> Self {
        if in_rule_dir {
            ContentKind::Rules
        } else if file_name.contains("PROCEDURES")
            || file_name.contains("Large_Statements")
            || file_name.contains("TRIGGERS")
        {
            ContentKind::Procedural
        } else if file_name.contains("Rules") {
            ContentKind::Rules
        } else {
            ContentKind::Statements
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::Statements => write!(f, "statements"),
            ContentKind::Procedural => write!(f, "procedural"),
            ContentKind::Rules => write!(f, "rules"),
        }
    }
}

/// Line terminator variant used when splitting rule blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// `\r\n`, tried first.
    Crlf,
    /// `\n`, the fallback.
    Lf,
}

impl LineEnding {
    /// Full rule delimiter for this line ending.
    pub fn rule_delimiter(self) -> &'static str {
        match self {
            LineEnding::Crlf => ";--end\r\n",
            LineEnding::Lf => ";--end\n",
        }
    }
}

/// Remove a leading `set define off;` directive, if present.
pub fn strip_directive(sql: &str) -> &str {
    sql.strip_prefix(DEFINE_OFF_DIRECTIVE).unwrap_or(sql)
}

/// Split `sql` on `delimiter`, trimming fragments and dropping blank ones.
pub fn split_on(sql: &str, delimiter: &str) -> Vec<String> {
    sql.split(delimiter)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Split a file's raw SQL into statements for its content kind.
///
/// Rule content is split with the CRLF delimiter; callers re-split with
/// [`split_rules`] and [`LineEnding::Lf`] when execution of that first pass fails.
pub fn split_statements(raw_sql: &str, kind: ContentKind) -> Vec<String> {
    let sql = strip_directive(raw_sql);
    match kind {
        ContentKind::Statements => split_on(sql, STATEMENT_DELIMITER),
        ContentKind::Procedural => split_on(sql, BLOCK_DELIMITER),
        ContentKind::Rules => split_rules(raw_sql, LineEnding::Crlf),
    }
}

/// Split rule content using the given line ending.
pub fn split_rules(raw_sql: &str, ending: LineEnding) -> Vec<String> {
    split_on(strip_directive(raw_sql), ending.rule_delimiter())
}

#[cfg(test)]
#[path = "splitter_test.rs"]
mod tests;
