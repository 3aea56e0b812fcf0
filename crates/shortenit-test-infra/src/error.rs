use thiserror::Error;

#[derive(Debug, Error)]
pub enum TestInfraError {
    #[error("container error: {0}")]
    Container(#[from] testcontainers::TestcontainersError),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("mysql error: {0}")]
    MySql(#[from] sqlx::Error),

    #[error("{service} did not accept connections after {attempts} attempts")]
    NotReady {
        service: &'static str,
        attempts: u32,
    },
}

pub type Result<T> = std::result::Result<T, TestInfraError>;
