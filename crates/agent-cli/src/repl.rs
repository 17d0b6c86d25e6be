//! Read-eval-print loop over the agent

use agent_suql::{Agent, DialogueHistory, TimeStatement};
use comfy_table::Table;
use std::io::{BufRead, Write};
use tracing::debug;

/// Whether `line` asks to end the session
pub fn is_quit(line: &str, quit_commands: &[String]) -> bool {
    quit_commands.iter().any(|q| q == line)
}

/// Per-stage timings as a table
pub fn timing_table(timings: &TimeStatement) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Stage", "Seconds"]);
    for (stage, secs) in timings.iter() {
        table.add_row(vec![stage.to_string(), format!("{secs:.3}")]);
    }
    table
}

/// Chat until a quit command or end of input
pub async fn run<R: BufRead, W: Write>(
    agent: &Agent,
    history: &mut DialogueHistory,
    mut input: R,
    mut output: W,
    quit_commands: &[String],
    show_timings: bool,
) -> anyhow::Result<()> {
    loop {
        write!(output, "User: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            debug!("End of input");
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_quit(line, quit_commands) {
            break;
        }

        let turn = agent.compute_next_turn(history, line).await;
        writeln!(output, "Chatbot: {}", turn.agent_utterance().unwrap_or_default())?;
        if show_timings && !turn.time_statement().is_empty() {
            writeln!(output, "{}", timing_table(turn.time_statement()))?;
        }
    }
    Ok(())
}
