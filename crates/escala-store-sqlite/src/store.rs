//! [`SqliteStore`]: the SQLite implementation of [`RosterStore`].

use std::{collections::HashMap, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use escala_core::{
  assignment::{Assignment, NewAssignment},
  person::{NewPerson, Person},
  store::RosterStore,
  user::{NewUser, User},
};

use crate::{
  Result,
  encode::{
    RawAssignment, RawPerson, RawRef, RawUser, encode_date, encode_dt, encode_ids,
    encode_instruments, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── SQL fragments ───────────────────────────────────────────────────────────

/// Every assignment column, with one `LEFT JOIN` per single-person slot so a
/// missing person comes back as a NULL name instead of dropping the row.
const ASSIGNMENT_SELECT: &str = "
  SELECT
    a.id, a.date, a.period,
    a.minister_id, m.name,
    a.backing_vocalists,
    a.guitar_id,   g.name,
    a.keyboard_id, k.name,
    a.bass_id,     b.name,
    a.drums_id,    d.name,
    a.created_at
  FROM assignments a
  LEFT JOIN people m ON m.id = a.minister_id
  LEFT JOIN people g ON g.id = a.guitar_id
  LEFT JOIN people k ON k.id = a.keyboard_id
  LEFT JOIN people b ON b.id = a.bass_id
  LEFT JOIN people d ON d.id = a.drums_id";

fn raw_assignment(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAssignment> {
  Ok(RawAssignment {
    id:                row.get(0)?,
    date:              row.get(1)?,
    period:            row.get(2)?,
    minister:          RawRef { id: row.get(3)?, name: row.get(4)? },
    backing_vocalists: row.get(5)?,
    guitar:            RawRef { id: row.get(6)?, name: row.get(7)? },
    keyboard:          RawRef { id: row.get(8)?, name: row.get(9)? },
    bass:              RawRef { id: row.get(10)?, name: row.get(11)? },
    drums:             RawRef { id: row.get(12)?, name: row.get(13)? },
    created_at:        row.get(14)?,
  })
}

fn raw_person(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPerson> {
  Ok(RawPerson {
    id:          row.get(0)?,
    name:        row.get(1)?,
    kind:        row.get(2)?,
    instruments: row.get(3)?,
    created_at:  row.get(4)?,
  })
}

fn raw_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
  Ok(RawUser {
    id:            row.get(0)?,
    email:         row.get(1)?,
    name:          row.get(2)?,
    role:          row.get(3)?,
    password_hash: row.get(4)?,
    created_at:    row.get(5)?,
  })
}

/// Id → name for every person, used to resolve backing-vocalist lists.
fn person_names(conn: &rusqlite::Connection) -> rusqlite::Result<HashMap<String, String>> {
  let mut stmt = conn.prepare("SELECT id, name FROM people")?;
  let names = stmt
    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
    .collect::<rusqlite::Result<HashMap<String, String>>>()?;
  Ok(names)
}

/// Assignment columns in bind order, encoded for storage.
struct AssignmentParams {
  date:              String,
  period:            String,
  minister_id:       Option<String>,
  backing_vocalists: String,
  guitar_id:         Option<String>,
  keyboard_id:       Option<String>,
  bass_id:           Option<String>,
  drums_id:          Option<String>,
}

impl AssignmentParams {
  fn encode(input: &NewAssignment) -> Result<Self> {
    let slots = &input.instrument_slots;
    Ok(Self {
      date:              encode_date(input.date),
      period:            input.period.as_ref().to_owned(),
      minister_id:       input.minister.map(encode_uuid),
      backing_vocalists: encode_ids(&input.backing_vocalists)?,
      guitar_id:         slots.guitar.map(encode_uuid),
      keyboard_id:       slots.keyboard.map(encode_uuid),
      bass_id:           slots.bass.map(encode_uuid),
      drums_id:          slots.drums.map(encode_uuid),
    })
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Escala roster store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Store a row exactly as given, bypassing period normalisation. Only used
  /// to reproduce rows written before the period column existed.
  #[cfg(test)]
  pub(crate) async fn insert_raw_assignment(
    &self,
    id: Uuid,
    date: &str,
    period: Option<&str>,
  ) -> Result<()> {
    let id_str = encode_uuid(id);
    let date = date.to_owned();
    let period = period.map(str::to_owned);
    let at_str = encode_dt(Utc::now());
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO assignments (id, date, period, created_at) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, date, period, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── RosterStore impl ────────────────────────────────────────────────────────

impl RosterStore for SqliteStore {
  type Error = crate::Error;

  // ── Person registry ───────────────────────────────────────────────────────

  async fn list_people(&self) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, name, kind, instruments, created_at
           FROM people
           ORDER BY name, rowid",
        )?;
        let rows = stmt
          .query_map([], raw_person)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn add_person(&self, input: NewPerson) -> Result<Person> {
    let person = Person {
      id:          Uuid::new_v4(),
      name:        input.name,
      kind:        input.kind,
      instruments: input.instruments,
      created_at:  Utc::now(),
    };

    let id_str          = encode_uuid(person.id);
    let name            = person.name.clone();
    let kind_str        = person.kind.as_ref().to_owned();
    let instruments_str = encode_instruments(&person.instruments)?;
    let at_str          = encode_dt(person.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO people (id, name, kind, instruments, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, kind_str, instruments_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(person)
  }

  async fn delete_person(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM people WHERE id = ?1", rusqlite::params![id_str])?)
      })
      .await?;
    tracing::debug!(%id, removed, "delete person");
    Ok(())
  }

  // ── Assignments ───────────────────────────────────────────────────────────

  async fn list_assignments(&self) -> Result<Vec<Assignment>> {
    let (raws, names) = self
      .conn
      .call(|conn| {
        let names = person_names(conn)?;
        let mut stmt = conn.prepare(&format!("{ASSIGNMENT_SELECT} ORDER BY a.date, a.rowid"))?;
        let rows = stmt
          .query_map([], raw_assignment)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((rows, names))
      })
      .await?;

    raws
      .into_iter()
      .map(|raw| raw.into_assignment(&names))
      .collect()
  }

  async fn get_assignment(&self, id: Uuid) -> Result<Option<Assignment>> {
    let id_str = encode_uuid(id);

    let found = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!("{ASSIGNMENT_SELECT} WHERE a.id = ?1"),
            rusqlite::params![id_str],
            raw_assignment,
          )
          .optional()?;
        match raw {
          Some(raw) => Ok(Some((raw, person_names(conn)?))),
          None => Ok(None),
        }
      })
      .await?;

    found
      .map(|(raw, names)| raw.into_assignment(&names))
      .transpose()
  }

  async fn add_assignment(&self, input: NewAssignment) -> Result<Assignment> {
    let id = Uuid::new_v4();
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());
    let p = AssignmentParams::encode(&input)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO assignments (
             id, date, period, minister_id, backing_vocalists,
             guitar_id, keyboard_id, bass_id, drums_id, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str,
            p.date,
            p.period,
            p.minister_id,
            p.backing_vocalists,
            p.guitar_id,
            p.keyboard_id,
            p.bass_id,
            p.drums_id,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    self
      .get_assignment(id)
      .await?
      .ok_or(crate::Error::MissingAfterWrite(id))
  }

  async fn update_assignment(
    &self,
    id:    Uuid,
    input: NewAssignment,
  ) -> Result<Option<Assignment>> {
    let id_str = encode_uuid(id);
    let p = AssignmentParams::encode(&input)?;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE assignments
           SET date = ?2, period = ?3, minister_id = ?4, backing_vocalists = ?5,
               guitar_id = ?6, keyboard_id = ?7, bass_id = ?8, drums_id = ?9
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            p.date,
            p.period,
            p.minister_id,
            p.backing_vocalists,
            p.guitar_id,
            p.keyboard_id,
            p.bass_id,
            p.drums_id,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_assignment(id).await
  }

  async fn delete_assignment(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM assignments WHERE id = ?1", rusqlite::params![id_str])?)
      })
      .await?;
    tracing::debug!(%id, removed, "delete assignment");
    Ok(())
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn count_users(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?))
      .await?;
    Ok(count.max(0) as u64)
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let email = email.trim().to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id, email, name, role, password_hash, created_at
             FROM users WHERE email = ?1",
            rusqlite::params![email],
            raw_user,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn add_user(&self, input: NewUser) -> Result<Option<User>> {
    let user = User {
      id:            Uuid::new_v4(),
      email:         input.email.trim().to_owned(),
      name:          input.name.trim().to_owned(),
      role:          input.role,
      password_hash: input.password_hash,
      created_at:    Utc::now(),
    };

    let id_str   = encode_uuid(user.id);
    let email    = user.email.clone();
    let name     = user.name.clone();
    let role     = user.role.clone();
    let hash     = user.password_hash.clone();
    let at_str   = encode_dt(user.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO users (id, email, name, role, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT(email) DO NOTHING",
          rusqlite::params![id_str, email, name, role, hash, at_str],
        )?)
      })
      .await?;

    Ok((inserted > 0).then_some(user))
  }
}
