mod session_repository;

pub use session_repository::SqliteSessionRepository;
