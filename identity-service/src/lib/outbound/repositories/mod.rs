pub mod credential;
pub mod password_reset;
pub mod refresh_token;
pub mod subject;

pub use credential::PostgresCredentialRepository;
pub use password_reset::PostgresPasswordResetRepository;
pub use refresh_token::PostgresRefreshTokenRepository;
pub use subject::PostgresSubjectRepository;
