pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("Unknown {kind} value: {value}.")]
	UnknownValue { kind: &'static str, value: String },
}
