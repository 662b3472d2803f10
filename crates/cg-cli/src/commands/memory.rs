use cg_core::UserId;
use cg_engine::MemorySessionResult;

use super::Session;

pub fn submit(
    session: &Session,
    user: UserId,
    result: &MemorySessionResult,
    json: bool,
) -> Result<(), String> {
    let outcome = session
        .service()
        .submit_memory(user, result)
        .map_err(|e| e.to_string())?;
    super::print_outcome(&outcome, json)
}
