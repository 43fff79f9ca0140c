/// Failures of the note table and the memory collection.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error(transparent)]
	Qdrant(#[from] Box<qdrant_client::QdrantError>),
	/// The embedding provider and the collection disagree on vector size.
	#[error("Embedding has {actual} dimensions; collection expects {expected}.")]
	DimensionMismatch { expected: u32, actual: usize },
	/// A stored row or point that cannot be mapped back to a note.
	#[error("Stored note is unreadable: {message}")]
	CorruptNote { message: String },
}
impl From<qdrant_client::QdrantError> for Error {
	fn from(err: qdrant_client::QdrantError) -> Self {
		Self::Qdrant(Box::new(err))
	}
}
