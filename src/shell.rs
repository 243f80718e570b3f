//! Line-oriented console front end for the `carepulse` binary.
//!
//! Parsing is pure (`parse_line`); `execute` maps a command onto the
//! command layer and prints the outcome plus any pending notification.

use std::io::{self, BufRead, Write};

use crate::commands::{appointment, doctors, session};
use crate::core_state::CoreState;
use crate::identity::Registration;
use crate::lifecycle;
use crate::models::{Appointment, NotificationKind};

pub const HELP: &str = "\
commands:
  login <phone> [name]            log in (0000 opens the admin dashboard)
  register <phone> <name>         sign up as a named patient
  logout | whoami
  doctors                         list doctors and their slots
  book <doctor> <date> <time> [notes]
  cancel <id>                     cancel an appointment
  approve <id>                    admin: approve a pending appointment
  status <id> <status>            admin: set scheduled or cancelled
  mine | all | stats              patient list, admin list, admin summary
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    Help,
    Quit,
    Login { phone: String, name: Option<String> },
    Register { phone: String, name: String },
    Logout,
    WhoAmI,
    Doctors,
    Book {
        doctor_id: String,
        date: String,
        time: String,
        notes: Option<String>,
    },
    Cancel(String),
    Approve(String),
    Status { id: String, status: String },
    Mine,
    All,
    Stats,
}

pub fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(ShellCommand::Empty);
    };
    let rest: Vec<&str> = words.collect();
    let tail = |from: usize| -> Option<String> {
        (rest.len() > from).then(|| rest[from..].join(" "))
    };

    let command = match (verb.to_ascii_lowercase().as_str(), rest.as_slice()) {
        ("help" | "?", _) => ShellCommand::Help,
        ("quit" | "exit", _) => ShellCommand::Quit,
        ("login", [phone, ..]) => ShellCommand::Login {
            phone: phone.to_string(),
            name: tail(1),
        },
        ("register", [phone, _, ..]) => ShellCommand::Register {
            phone: phone.to_string(),
            name: tail(1).unwrap_or_default(),
        },
        ("logout", []) => ShellCommand::Logout,
        ("whoami", []) => ShellCommand::WhoAmI,
        ("doctors", []) => ShellCommand::Doctors,
        ("book", [doctor, date, time, ..]) => ShellCommand::Book {
            doctor_id: doctor.to_string(),
            date: date.to_string(),
            time: time.to_string(),
            notes: tail(3),
        },
        ("cancel", [id]) => ShellCommand::Cancel(id.to_string()),
        ("approve", [id]) => ShellCommand::Approve(id.to_string()),
        ("status", [id, status]) => ShellCommand::Status {
            id: id.to_string(),
            status: status.to_string(),
        },
        ("mine", []) => ShellCommand::Mine,
        ("all", []) => ShellCommand::All,
        ("stats", []) => ShellCommand::Stats,
        (other, _) => {
            return Err(format!(
                "unknown or incomplete command '{other}', try 'help'"
            ));
        }
    };
    Ok(command)
}

/// Run one command. Returns `false` when the shell should exit.
pub fn execute<W: Write>(
    state: &CoreState,
    command: ShellCommand,
    out: &mut W,
) -> io::Result<bool> {
    let result: Result<(), String> = match command {
        ShellCommand::Empty => return Ok(true),
        ShellCommand::Quit => return Ok(false),
        ShellCommand::Help => {
            writeln!(out, "{HELP}")?;
            return Ok(true);
        }
        ShellCommand::Login { phone, name } => {
            match session::login(state, &phone, name.as_deref()) {
                Ok(user) => {
                    writeln!(
                        out,
                        "logged in as {} ({}, {})",
                        user.name, user.role, user.id
                    )?;
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        ShellCommand::Register { phone, name } => {
            let registration = Registration {
                phone,
                name,
                ..Registration::default()
            };
            match session::register(state, registration) {
                Ok(user) => {
                    writeln!(out, "registered {} ({})", user.name, user.id)?;
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        ShellCommand::Logout => match session::logout(state) {
            Ok(()) => {
                writeln!(out, "logged out")?;
                Ok(())
            }
            Err(e) => Err(e),
        },
        ShellCommand::WhoAmI => {
            match session::current_user(state) {
                Some(user) => writeln!(
                    out,
                    "{} ({}, {}, {})",
                    user.name, user.role, user.phone, user.id
                )?,
                None => writeln!(out, "not logged in")?,
            }
            Ok(())
        }
        ShellCommand::Doctors => {
            for doctor in doctors::list_doctors(state) {
                writeln!(
                    out,
                    "{:<4} {:<22} {:<22} {}",
                    doctor.id,
                    doctor.name,
                    doctor.specialty,
                    doctor.availability.join(" ")
                )?;
            }
            Ok(())
        }
        ShellCommand::Book {
            doctor_id,
            date,
            time,
            notes,
        } => {
            let request = appointment::BookingRequest {
                doctor_id,
                date,
                time,
                notes,
            };
            match appointment::book_appointment(state, request) {
                Ok(apt) => {
                    print_appointment(state, out, &apt)?;
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        ShellCommand::Cancel(id) => match appointment::cancel_appointment(state, &id) {
            Ok(apt) => {
                print_appointment(state, out, &apt)?;
                Ok(())
            }
            Err(e) => Err(e),
        },
        ShellCommand::Approve(id) => match appointment::approve_appointment(state, &id) {
            Ok(apt) => {
                print_appointment(state, out, &apt)?;
                Ok(())
            }
            Err(e) => Err(e),
        },
        ShellCommand::Status { id, status } => {
            match appointment::update_appointment_status(state, &id, &status) {
                Ok(apt) => {
                    print_appointment(state, out, &apt)?;
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        ShellCommand::Mine => match appointment::list_my_appointments(state) {
            Ok(list) => {
                if list.is_empty() {
                    writeln!(out, "no appointments")?;
                }
                for apt in &list {
                    print_appointment(state, out, apt)?;
                }
                Ok(())
            }
            Err(e) => Err(e),
        },
        ShellCommand::All => match appointment::list_all_appointments(state) {
            Ok(list) => {
                for apt in &list {
                    print_appointment(state, out, apt)?;
                }
                Ok(())
            }
            Err(e) => Err(e),
        },
        ShellCommand::Stats => match appointment::admin_dashboard(state) {
            Ok(dash) => {
                let c = dash.counts;
                writeln!(
                    out,
                    "total {}  scheduled {}  pending {}  cancelled {}  completed {}",
                    c.total, c.scheduled, c.pending, c.cancelled, c.completed
                )?;
                Ok(())
            }
            Err(e) => Err(e),
        },
    };

    // Errors are already raised as notifications by the command layer.
    if let Err(message) = &result {
        tracing::debug!(error = %message, "Shell command failed");
    }
    if let Some(notification) = state.take_notification() {
        let tag = match notification.kind {
            NotificationKind::Success => "ok",
            NotificationKind::Error => "error",
        };
        writeln!(out, "[{tag}] {}", notification.message)?;
    }
    Ok(true)
}

fn print_appointment<W: Write>(
    state: &CoreState,
    out: &mut W,
    apt: &Appointment,
) -> io::Result<()> {
    let doctor = state
        .directory()
        .get(&apt.doctor_id)
        .map(|d| d.name.as_str())
        .unwrap_or("Unknown doctor");
    let action = if lifecycle::patient_cancellable(apt.status) {
        ""
    } else {
        " (closed)"
    };
    writeln!(
        out,
        "{}  {} {}  {:<20} {:<10} {}{}",
        apt.id, apt.date, apt.time, doctor, apt.status, apt.patient_name, action
    )
}

/// Read commands from `input` until EOF or `quit`.
pub fn run_loop<R: BufRead, W: Write>(
    state: &CoreState,
    input: R,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "CarePulse: type 'help' for commands")?;
    for line in input.lines() {
        let line = line?;
        let keep_going = match parse_line(&line) {
            Ok(command) => execute(state, command, out)?,
            Err(message) => {
                writeln!(out, "[error] {message}")?;
                true
            }
        };
        if !keep_going {
            break;
        }
        out.flush()?;
    }
    Ok(())
}
