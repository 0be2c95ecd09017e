//! Line-oriented terminal presentation for a combat session

use std::fmt::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::application::services::combat::{
    CombatHandle, CombatOutcome, CombatView, MenuKind, PlayerCommand,
};
use crate::application::CombatError;

/// What a line of input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Command(PlayerCommand),
    Quit,
    /// Input that maps to nothing; the message is shown to the player
    Invalid(String),
}

/// Render a full screen for `view`.
pub fn render(view: &CombatView) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Combat #{} ===", view.encounter_id);
    let _ = writeln!(out, "Participants:");
    for p in &view.participants {
        let marker = if p.active { ">" } else { " " };
        let status = if p.alive { "" } else { " (down)" };
        let _ = writeln!(
            out,
            "  {marker} {} [{}] HP: {}{status}",
            p.name, p.actor_id, p.hp
        );
    }

    let turn = if view.is_local_turn {
        format!("{} (your turn)", view.active_actor)
    } else {
        view.active_actor.to_string()
    };
    let _ = writeln!(out, "Turn: {turn}");
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", view.menu.title);
    if view.menu.kind == MenuKind::SelectTarget
        && !view
            .menu
            .options
            .iter()
            .any(|o| matches!(o.command, PlayerCommand::ChooseTarget(_)))
    {
        let _ = writeln!(out, "  No living targets!");
    }
    for (number, option) in view.menu.options.iter().enumerate() {
        let note = if option.enabled { "" } else { " (unavailable)" };
        let _ = writeln!(out, "  {}. {}{note}", number + 1, option.label);
    }
    if view.processing {
        let _ = writeln!(out, "  ...");
    }
    if !view.ended {
        let _ = writeln!(out, "  q. Leave combat");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Log:");
    for line in &view.log {
        let _ = writeln!(out, "  {line}");
    }

    out
}

/// Map one input line to a choice against the options in `view`.
pub fn parse_choice(input: &str, view: &CombatView) -> Choice {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit") {
        return Choice::Quit;
    }

    let Ok(number) = input.parse::<usize>() else {
        return Choice::Invalid(format!("Enter an option number or q, not {input:?}"));
    };
    match number
        .checked_sub(1)
        .and_then(|index| view.menu.options.get(index))
    {
        Some(option) if option.enabled => Choice::Command(option.command.clone()),
        Some(option) => Choice::Invalid(format!("{} is not available right now", option.label)),
        None => Choice::Invalid(format!("No option {number}")),
    }
}

/// Pass one input choice to the controller. `false` once the controller has stopped.
fn forward(handle: &CombatHandle, choice: Choice) -> bool {
    let sent = match choice {
        Choice::Command(command) => handle.send(command),
        Choice::Quit => handle.exit(),
        Choice::Invalid(message) => {
            println!("{message}");
            return true;
        }
    };
    if sent.is_err() {
        tracing::debug!("Controller stopped before input was delivered");
    }
    sent.is_ok()
}

/// Play a combat session on stdin/stdout until the controller ends.
pub async fn run(mut handle: CombatHandle) -> Result<CombatOutcome, CombatError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut view = handle.view();
    println!("{}", render(&view));

    while !view.ended {
        tokio::select! {
            changed = handle.changed() => match changed {
                Ok(next) => {
                    view = next;
                    println!("{}", render(&view));
                }
                Err(CombatError::ControllerClosed) => break,
                Err(e) => return Err(e),
            },
            line = lines.next_line(), if stdin_open => {
                let choice = match line {
                    Ok(Some(line)) => parse_choice(&line, &view),
                    Ok(None) => {
                        tracing::info!("stdin closed, leaving combat");
                        stdin_open = false;
                        Choice::Quit
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read input, leaving combat");
                        stdin_open = false;
                        Choice::Quit
                    }
                };
                if !forward(&handle, choice) {
                    break;
                }
            }
        }
    }

    // The controller publishes its final view before stopping.
    Ok(handle.view().outcome.unwrap_or(CombatOutcome::Abandoned))
}
