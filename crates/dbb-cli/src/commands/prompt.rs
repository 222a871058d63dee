//! Interactive operator prompts on a terminal

use dbb_core::{ChangeScript, SchemaName};
use dbb_runner::{ConfirmRequest, Operator};
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};
use std::sync::Mutex;

const BANNER_RULE: &str = "*************************************************************";

/// Operator that asks on an input stream and writes to an output stream.
pub(crate) struct PromptOperator<R, W> {
    input: Mutex<R>,
    output: Mutex<W>,
}

impl PromptOperator<BufReader<Stdin>, Stdout> {
    /// Prompt on the process's standard streams
    pub(crate) fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead + Send, W: Write + Send> PromptOperator<R, W> {
    pub(crate) fn new(input: R, output: W) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
        }
    }

    fn write_out(&self, text: &str) -> io::Result<()> {
        let mut out = self
            .output
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?;
        out.write_all(text.as_bytes())?;
        out.flush()
    }

    fn read_answer(&self) -> io::Result<String> {
        let mut input = self
            .input
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?;
        let mut line = String::new();
        input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn ask(&self, request: &ConfirmRequest<'_>) -> io::Result<bool> {
        self.write_out(&confirm_banner(request))?;
        Ok(self.read_answer()?.eq_ignore_ascii_case("yes"))
    }

    fn pause_on_drift(&self, schema: &SchemaName, latest: &ChangeScript) -> io::Result<()> {
        self.write_out(&drift_notice(schema, latest))?;
        self.read_answer()?;
        Ok(())
    }
}

impl<R: BufRead + Send, W: Write + Send> Operator for PromptOperator<R, W> {
    fn confirm(&self, request: &ConfirmRequest<'_>) -> bool {
        match self.ask(request) {
            Ok(approved) => approved,
            Err(e) => {
                log::error!("Could not read confirmation: {}", e);
                false
            }
        }
    }

    fn notify_drift(&self, schema: &SchemaName, latest: &ChangeScript) {
        if let Err(e) = self.pause_on_drift(schema, latest) {
            log::error!("Could not show drift notice: {}", e);
        }
    }
}

/// Text shown before applying a schema's pending scripts.
pub(crate) fn confirm_banner(request: &ConfirmRequest<'_>) -> String {
    let mut text = String::new();
    text.push_str("The database schema being updated is as follows:\n");
    text.push_str(&format!("\tSchema: {}\n", request.schema));
    text.push_str(&format!("\tLocation: {}\n", request.location));
    text.push_str(&format!("\tUser: {}\n", request.user));
    text.push_str("\nThe changes to be applied are as follows:\n");
    for script in request.pending {
        text.push_str(&format!("\t{}) {}\n", script.order().normalize(), script.name()));
    }
    text.push_str("Please enter yes to continue: ");
    text
}

/// Text shown when the ledger is ahead of the filesystem.
pub(crate) fn drift_notice(schema: &SchemaName, latest: &ChangeScript) -> String {
    format!(
        "{rule}\n\
         The database schema {schema} has been advanced beyond the file system.\n\
         This can occur when a feature or bugfix branch has been applied\n\
         to this database and then the code base is returned to an older\n\
         version.\n\
         The task in the database but not in the file system is:\n\n\
         {latest}\n\
         {rule}\n\
         Press enter to continue: ",
        rule = BANNER_RULE,
    )
}

#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;
