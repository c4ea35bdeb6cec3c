pub mod credentials;
pub mod writer;

pub use credentials::{CredentialExtractor, Credentials, Extraction};
pub use writer::CredentialWriter;
