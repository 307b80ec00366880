//! Non-interactive subcommands.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use escala_core::{
  assignment::{InstrumentSlots, Period},
  person::{Instrument, PersonKind},
  roster::MonthKey,
};
use uuid::Uuid;

use crate::{
  cache::{RosterCache, Slot},
  client::{AssignmentRequest, PersonRequest},
  render,
};

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Manage the person registry.
  #[command(subcommand)]
  People(PeopleCommand),

  /// Manage dated service assignments.
  #[command(subcommand)]
  Assignments(AssignmentCommand),

  /// Show the monthly roster.
  #[command(subcommand)]
  Roster(RosterCommand),
}

#[derive(Subcommand, Debug)]
pub enum PeopleCommand {
  /// List everyone, ordered by name.
  List,
  /// Register a person.
  Add {
    name: String,
    /// minister, backing_vocalist or instrumentalist.
    #[arg(long)]
    kind: PersonKind,
    /// Instrument tag (guitar, keyboard, bass, drums). Repeatable.
    #[arg(long = "instrument")]
    instruments: Vec<Instrument>,
  },
  /// Remove a person by name or id.
  Remove { person: String },
}

#[derive(Subcommand, Debug)]
pub enum AssignmentCommand {
  /// List every assignment with its id.
  List,
  /// Schedule a service.
  Add(AssignmentArgs),
  /// Replace every field of an existing assignment.
  Edit {
    id: Uuid,
    #[command(flatten)]
    fields: AssignmentArgs,
  },
  /// Remove an assignment by id.
  Remove { id: Uuid },
}

/// Slot arguments name people by display name or id.
#[derive(Args, Debug)]
pub struct AssignmentArgs {
  /// Service date, YYYY-MM-DD.
  #[arg(long)]
  pub date:     String,
  /// morning or evening. Required on Sundays, ignored on other days.
  #[arg(long)]
  pub period:   Option<Period>,
  #[arg(long)]
  pub minister: Option<String>,
  /// Backing vocalist. Repeatable.
  #[arg(long = "vocal")]
  pub vocals:   Vec<String>,
  #[arg(long)]
  pub guitar:   Option<String>,
  #[arg(long)]
  pub keyboard: Option<String>,
  #[arg(long)]
  pub bass:     Option<String>,
  #[arg(long)]
  pub drums:    Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum RosterCommand {
  /// Print one month, or write it to a file.
  Show {
    /// Month as YYYY-MM. Defaults to the current month.
    #[arg(long)]
    month: Option<MonthKey>,
    /// Write the rendered roster here instead of stdout.
    #[arg(long, value_name = "FILE")]
    out:   Option<PathBuf>,
  },
}

/// Run one subcommand. `roster show` asks the server for the grouped month
/// directly; the others load the cache first.
pub async fn run(cache: &mut RosterCache, command: Command) -> Result<()> {
  match command {
    Command::People(cmd) => {
      cache.reload().await.context("loading roster data")?;
      people(cache, cmd).await
    }
    Command::Assignments(cmd) => {
      cache.reload().await.context("loading roster data")?;
      assignments(cache, cmd).await
    }
    Command::Roster(RosterCommand::Show { month, out }) => {
      let month = month.unwrap_or_else(MonthKey::current);
      let roster = cache.client().roster(month).await?;
      let text = render::render_roster(&roster);
      match out {
        Some(path) => {
          std::fs::write(&path, text)
            .with_context(|| format!("writing {}", path.display()))?;
          println!("Roster {month} written to {}", path.display());
        }
        None => print!("{text}"),
      }
      Ok(())
    }
  }
}

async fn people(cache: &mut RosterCache, cmd: PeopleCommand) -> Result<()> {
  match cmd {
    PeopleCommand::List => {
      for p in cache.people() {
        let tags = p
          .instruments
          .iter()
          .map(|i| i.to_string())
          .collect::<Vec<_>>()
          .join(", ");
        println!("{}  {:<24} {:<17} {tags}", p.id, p.name, p.kind.as_ref());
      }
    }
    PeopleCommand::Add {
      name,
      kind,
      instruments,
    } => {
      let person = cache
        .add_person(&PersonRequest {
          nome: name,
          tipo: kind,
          instrumentos: instruments,
        })
        .await?;
      println!("Added {} ({})", person.name, person.id);
    }
    PeopleCommand::Remove { person } => {
      let (id, name) = {
        let p = cache.find_person(&person, None)?;
        (p.id, p.name.clone())
      };
      cache.delete_person(id).await?;
      println!("Removed {name}");
    }
  }
  Ok(())
}

async fn assignments(cache: &mut RosterCache, cmd: AssignmentCommand) -> Result<()> {
  match cmd {
    AssignmentCommand::List => {
      for a in cache.assignments() {
        println!("{}  {}", a.id, render::date_label(a));
      }
    }
    AssignmentCommand::Add(args) => {
      let body = resolve(cache, None, &args)?;
      let stored = cache.add_assignment(&body).await?;
      println!("Scheduled {} ({})", render::date_label(&stored), stored.id);
    }
    AssignmentCommand::Edit { id, fields } => {
      if !cache.assignments().iter().any(|a| a.id == id) {
        bail!("no assignment with id {id}");
      }
      let body = resolve(cache, Some(id), &fields)?;
      let stored = cache.update_assignment(&body).await?;
      println!("Updated {} ({})", render::date_label(&stored), stored.id);
    }
    AssignmentCommand::Remove { id } => {
      cache.delete_assignment(id).await?;
      println!("Removed assignment {id}");
    }
  }
  Ok(())
}

/// Turn named slot arguments into a request body of person ids, applying the
/// eligibility rules for each slot.
fn resolve(
  cache: &RosterCache,
  id: Option<Uuid>,
  args: &AssignmentArgs,
) -> Result<AssignmentRequest> {
  let pick = |name: &Option<String>, slot: Slot| -> Result<Option<Uuid>> {
    name
      .as_deref()
      .map(|n| cache.find_person(n, Some(slot)).map(|p| p.id))
      .transpose()
  };

  let mut instrument_slots = InstrumentSlots::default();
  for (instrument, name) in [
    (Instrument::Guitar, &args.guitar),
    (Instrument::Keyboard, &args.keyboard),
    (Instrument::Bass, &args.bass),
    (Instrument::Drums, &args.drums),
  ] {
    instrument_slots.set(instrument, pick(name, Slot::Instrument(instrument))?);
  }

  let backing_vocalists = args
    .vocals
    .iter()
    .map(|n| cache.find_person(n, Some(Slot::BackingVocal)).map(|p| p.id))
    .collect::<Result<Vec<_>>>()?;

  Ok(AssignmentRequest {
    id,
    data: args.date.clone(),
    periodo: args.period,
    minister: pick(&args.minister, Slot::Minister)?,
    backing_vocalists,
    instrument_slots,
  })
}
