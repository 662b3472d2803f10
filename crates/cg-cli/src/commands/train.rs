use cg_core::UserId;
use cg_engine::TrainSessionResult;

use super::Session;

pub fn submit(
    session: &Session,
    user: UserId,
    result: &TrainSessionResult,
    json: bool,
) -> Result<(), String> {
    let outcome = session
        .service()
        .submit_train(user, result)
        .map_err(|e| e.to_string())?;
    super::print_outcome(&outcome, json)
}
