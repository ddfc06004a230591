use crate::error::PlanningError;

pub type PlanningResult<T> = Result<T, PlanningError>;
