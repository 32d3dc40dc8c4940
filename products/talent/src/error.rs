use sea_orm::DbErr;
use thiserror::Error;

pub type TalentResult<T> = Result<T, TalentError>;

#[derive(Debug, Error)]
pub enum TalentError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("{entity} {id} is fixed and can only be changed by its owner")]
    NotOwner { entity: &'static str, id: i64 },
    #[error("username `{0}` is already taken")]
    UsernameTaken(String),
    #[error("unrecognized CRM stage name `{0}`")]
    UnknownStage(String),
    #[error("malformed watcher id list `{0}`")]
    InvalidWatcherIds(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl TalentError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}
