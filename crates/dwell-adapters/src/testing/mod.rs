mod failing_repository;

pub use failing_repository::FailingSessionRepository;
