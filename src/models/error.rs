use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to connect to the database: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("race results query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("failed to render figure: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl<E> From<DrawingAreaErrorKind<E>> for Error
where
    E: std::error::Error + Send + Sync,
{
    fn from(error: DrawingAreaErrorKind<E>) -> Self {
        Self::Render(error.to_string())
    }
}
