//! Interactive play on stdin/stdout

use std::io::{self, BufRead, Write};

use anyhow::Result;
use crossterm::{cursor, queue, style::Print};

use tr_core::REEL_ROWS;
use tr_machine::{ReelEventKind, SlotMachine, SpinEvent, WallClock};

use crate::display;

const HELP: &str = "\
Commands:
  <enter>, spin   spin the reels
  +, -            raise / lower the bet
  bet <n>         set the bet (1-100)
  level <n>       set the difficulty level (1-5)
  add             add funds
  stats           show statistics
  reset           restart with default balances
  help            this text
  quit            leave";

pub fn run(mut machine: SlotMachine) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock().lines();
    let mut out = io::stdout();

    writeln!(out, "{HELP}\n")?;
    write!(out, "{}", display::render_reels(&machine.reels()))?;
    writeln!(out, "{}", display::status_line(&machine))?;

    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = input.next().transpose()? else {
            break;
        };

        let mut words = line.split_whitespace();
        match (words.next().unwrap_or("spin"), words.next()) {
            ("spin" | "s", _) => spin(&mut machine, &mut out)?,
            ("+", _) => {
                machine.increase_bet();
            }
            ("-", _) => {
                machine.decrease_bet();
            }
            ("bet", Some(n)) => match n.parse() {
                Ok(n) => {
                    machine.set_bet(n);
                }
                Err(_) => writeln!(out, "Not a number: {n}")?,
            },
            ("level", Some(n)) => match n.parse() {
                Ok(n) => {
                    machine.set_level(n);
                }
                Err(_) => writeln!(out, "Not a number: {n}")?,
            },
            ("add", _) => {
                let added = machine.add_funds(&mut |message: &str| {
                    print!("{message} ");
                    io::stdout().flush().ok();
                    input.next().and_then(|line| line.ok())
                });
                match added {
                    Ok(Some(amount)) => writeln!(out, "Added {amount}")?,
                    Ok(None) => {}
                    Err(e) => writeln!(out, "Funds added but not saved: {e}")?,
                }
            }
            ("reset", _) => {
                let done = machine.reset(&mut |message: &str| {
                    print!("{message} [y/N] ");
                    io::stdout().flush().ok();
                    input
                        .next()
                        .and_then(|line| line.ok())
                        .is_some_and(|answer| answer.trim().eq_ignore_ascii_case("y"))
                });
                match done {
                    Ok(true) => write!(out, "{}", display::render_reels(&machine.reels()))?,
                    Ok(false) => {}
                    Err(e) => writeln!(out, "Reset but not saved: {e}")?,
                }
            }
            ("stats", _) => write!(out, "{}", display::stats_table(machine.ledger().stats()))?,
            ("help" | "?", _) => writeln!(out, "{HELP}")?,
            ("quit" | "q" | "exit", _) => break,
            (other, _) => writeln!(out, "Unknown command: {other} (try help)")?,
        }

        writeln!(out, "{}", display::status_line(&machine))?;
    }
    Ok(())
}

fn spin(machine: &mut SlotMachine, out: &mut impl Write) -> Result<()> {
    if let Err(rejection) = machine.spin() {
        writeln!(out, "{}", display::rejection_message(&rejection))?;
        return Ok(());
    }

    let mut windows = machine.reels();
    write!(out, "{}", display::render_reels(&windows))?;
    let mut clock = WallClock::new();
    let mut redraw_failed = None;

    let summary = machine.run_spin(&mut clock, |event| {
        let SpinEvent::Reel(event) = event else {
            return;
        };
        match &event.kind {
            ReelEventKind::Tick { window, .. } => windows[event.reel_index] = *window,
            ReelEventKind::Settled { symbol } => windows[event.reel_index] = [*symbol; 3],
            ReelEventKind::Started => return,
        }
        // draw over the previous frame
        let frame = display::render_reels(&windows);
        let drawn = queue!(out, cursor::MoveToPreviousLine(REEL_ROWS as u16), Print(frame))
            .and_then(|()| out.flush());
        if let Err(e) = drawn {
            redraw_failed.get_or_insert(e);
        }
    });

    if let Some(e) = redraw_failed {
        return Err(e.into());
    }
    match summary {
        Some(summary) => {
            writeln!(out, "{}", display::spin_message(&summary))?;
            if !summary.persisted {
                writeln!(out, "(session could not be saved)")?;
            }
        }
        None => writeln!(out, "Spin could not be paid out")?,
    }
    Ok(())
}
