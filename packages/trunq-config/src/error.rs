use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Cannot read trunq config {}: {source}", path.display())]
	ReadConfig { path: PathBuf, source: std::io::Error },
	#[error("Cannot parse trunq config {}: {source}", path.display())]
	ParseConfig { path: PathBuf, source: toml::de::Error },
	/// A loaded config that breaks a cross-field rule. `message` names the offending key.
	#[error("Invalid trunq config: {message}")]
	Validation { message: String },
}
