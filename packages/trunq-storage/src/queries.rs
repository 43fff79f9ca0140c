use trunq_domain::{IntentMembership, NoteRecord};

use crate::{Result, db::Db, models::NoteRow};

const NOTE_COLUMNS: &str = "note_id, namespace, raw_text, formatted_text, title, intent, tags, \
	scheduled_for, has_deadline, created_at";

pub async fn insert_note(db: &Db, note: &NoteRecord) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO notes (
	note_id,
	namespace,
	raw_text,
	formatted_text,
	title,
	intent,
	tags,
	scheduled_for,
	has_deadline,
	created_at
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)",
	)
	.bind(note.note_id)
	.bind(note.namespace.as_str())
	.bind(note.raw_text.as_str())
	.bind(note.formatted_text.as_str())
	.bind(note.title.as_str())
	.bind(note.intent.as_str())
	.bind(&note.tags)
	.bind(note.scheduled_for)
	.bind(note.has_deadline)
	.bind(note.created_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

/// Notes whose intent is one of `membership.intents`, newest first.
pub async fn list_notes_by_intents(
	db: &Db,
	namespace: &str,
	membership: &IntentMembership,
	limit: u32,
) -> Result<Vec<NoteRecord>> {
	if membership.intents.is_empty() {
		return Ok(Vec::new());
	}

	let sql = format!(
		"SELECT {NOTE_COLUMNS} FROM notes \
		WHERE namespace = $1 AND intent = ANY($2) \
		ORDER BY created_at DESC \
		LIMIT $3"
	);
	let rows: Vec<NoteRow> = sqlx::query_as(&sql)
		.bind(namespace)
		.bind(membership.as_strings())
		.bind(i64::from(limit))
		.fetch_all(&db.pool)
		.await?;

	rows.into_iter().map(NoteRecord::try_from).collect()
}

/// Case-insensitive substring match over the raw text.
pub async fn search_notes_text(
	db: &Db,
	namespace: &str,
	needle: &str,
	limit: u32,
) -> Result<Vec<NoteRecord>> {
	let sql = format!(
		"SELECT {NOTE_COLUMNS} FROM notes \
		WHERE namespace = $1 AND raw_text ILIKE $2 ESCAPE '\\' \
		ORDER BY created_at DESC \
		LIMIT $3"
	);
	let rows: Vec<NoteRow> = sqlx::query_as(&sql)
		.bind(namespace)
		.bind(like_pattern(needle))
		.bind(i64::from(limit))
		.fetch_all(&db.pool)
		.await?;

	rows.into_iter().map(NoteRecord::try_from).collect()
}

fn like_pattern(needle: &str) -> String {
	let mut out = String::with_capacity(needle.len() + 2);

	out.push('%');

	for ch in needle.chars() {
		if matches!(ch, '%' | '_' | '\\') {
			out.push('\\');
		}

		out.push(ch);
	}

	out.push('%');

	out
}
