//! Line-oriented play loop. Generic over its streams so it can be driven
//! from tests as easily as from a terminal.

use crate::controller::GameController;
use dice_bot::TurnOutcome;
use dice_core::game::round::ChallengeOutcome;
use dice_core::model::bid::{Bid, BidError};
use dice_core::model::side::Side;
use std::io::{self, BufRead, Write};

const HELP: &str = "Commands: <quantity> <face> to bid (e.g. `3 5`), `liar` to challenge, \
`hint` for the smallest raise, `dice` to look at your cup, `quit` to leave.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Bid(Bid),
    Liar,
    Hint,
    Dice,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, BidError> {
    let trimmed = line.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "liar" | "l" | "call" | "challenge" => Ok(Command::Liar),
        "hint" | "h" | "?" => Ok(Command::Hint),
        "dice" | "d" | "cup" => Ok(Command::Dice),
        "help" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        _ => trimmed.parse().map(Command::Bid),
    }
}

/// Play until the match ends or input runs out. Returns the winner, or
/// `None` when the player quit.
pub fn play_match<R: BufRead, W: Write>(
    controller: &mut GameController,
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<Side>> {
    writeln!(out, "{HELP}")?;
    let mut announced_round = 0;
    let mut line = String::new();

    while !controller.is_over() {
        let round = controller.state().round_number();
        if round != announced_round {
            announced_round = round;
            writeln!(out)?;
            writeln!(out, "{}", controller.status_text())?;
            writeln!(out, "Your dice: {}", controller.human_hand())?;
        }

        if controller.expected_to_act() == Side::Computer {
            match controller.computer_turn().map_err(io::Error::other)? {
                TurnOutcome::Raised(bid) => writeln!(out, "Computer bids {bid}.")?,
                TurnOutcome::Challenged { outcome, .. } => {
                    writeln!(out, "Computer calls liar on {}!", outcome.bid)?;
                    describe_challenge(out, &outcome)?;
                }
            }
            continue;
        }

        write!(out, "> ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        match parse_command(&line) {
            Ok(Command::Bid(bid)) => {
                if let Err(err) = controller.submit_bid(bid) {
                    writeln!(out, "✗ {err}")?;
                }
            }
            Ok(Command::Liar) => match controller.call_liar() {
                Ok(outcome) => describe_challenge(out, &outcome)?,
                Err(err) => writeln!(out, "✗ {err}")?,
            },
            Ok(Command::Hint) => writeln!(out, "Smallest raise: {}", controller.suggested_bid())?,
            Ok(Command::Dice) => writeln!(out, "Your dice: {}", controller.human_hand())?,
            Ok(Command::Help) => writeln!(out, "{HELP}")?,
            Ok(Command::Quit) => return Ok(None),
            Err(err) => writeln!(out, "✗ {err}. Type `help` for commands.")?,
        }
    }

    let winner = controller.winner();
    match winner {
        Some(Side::Human) => writeln!(out, "You win the match!")?,
        Some(Side::Computer) => writeln!(out, "The computer wins the match.")?,
        None => {}
    }
    Ok(winner)
}

fn describe_challenge<W: Write>(out: &mut W, outcome: &ChallengeOutcome) -> io::Result<()> {
    writeln!(
        out,
        "Revealed: you {} | computer {}",
        outcome.revealed[Side::Human.index()],
        outcome.revealed[Side::Computer.index()]
    )?;
    let verdict = if outcome.evaluation.bid_held {
        "the bid holds"
    } else {
        "the bid fails"
    };
    writeln!(
        out,
        "Found {} × {}s against a bid of {}: {verdict}. {} loses a die.",
        outcome.evaluation.actual_count, outcome.bid.face, outcome.bid, outcome.loser
    )
}
