use crate::domain::model::{CandidateRecord, VoterRecord};
use crate::domain::ports::{SqlSession, SqlValue};
use crate::utils::error::Result;

pub const INSERT_VOTER: &str = "
    INSERT INTO voters (
        voter_id, voter_name, date_of_birth, gender, nationality, registration_number,
        street, city, state, country, postcode, email, phone_number, cell_number,
        picture, registered_age
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)";

pub const INSERT_CANDIDATE: &str = "
    INSERT INTO candidates (
        candidate_id, candidate_name, candidate_index, total_candidates, picture
    ) VALUES ($1, $2, $3, $4, $5)";

fn voter_params(voter: &VoterRecord) -> Vec<SqlValue> {
    vec![
        voter.voter_id.as_str().into(),
        voter.voter_name.as_str().into(),
        voter.date_of_birth.as_str().into(),
        voter.gender.as_str().into(),
        voter.nationality.as_str().into(),
        voter.registration_number.as_str().into(),
        voter.address.street.as_str().into(),
        voter.address.city.as_str().into(),
        voter.address.state.as_str().into(),
        voter.address.country.as_str().into(),
        voter.address.postcode.as_str().into(),
        voter.email.as_str().into(),
        voter.phone_number.as_str().into(),
        voter.cell_number.as_str().into(),
        voter.picture.as_str().into(),
        voter.registered_age.into(),
    ]
}

fn candidate_params(candidate: &CandidateRecord) -> Vec<SqlValue> {
    vec![
        candidate.candidate_id.as_str().into(),
        candidate.candidate_name.as_str().into(),
        candidate.candidate_index.into(),
        candidate.total_candidates.into(),
        candidate.picture.as_str().into(),
    ]
}

// 一筆紀錄一個交易：成功才 commit，失敗則 rollback 後回傳原本的錯誤
async fn insert_one<S: SqlSession + ?Sized>(
    session: &mut S,
    sql: &str,
    params: &[SqlValue],
) -> Result<()> {
    match session.execute(sql, params).await {
        Ok(_) => session.commit().await,
        Err(e) => {
            if let Err(rollback_err) = session.rollback().await {
                tracing::warn!("Rollback after failed insert also failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

pub async fn insert_voter<S: SqlSession + ?Sized>(session: &mut S, voter: &VoterRecord) -> Result<()> {
    insert_one(session, INSERT_VOTER, &voter_params(voter)).await?;
    tracing::debug!("Inserted voter {} ({})", voter.voter_id, voter.voter_name);
    Ok(())
}

pub async fn insert_candidate<S: SqlSession + ?Sized>(
    session: &mut S,
    candidate: &CandidateRecord,
) -> Result<()> {
    insert_one(session, INSERT_CANDIDATE, &candidate_params(candidate)).await?;
    tracing::debug!(
        "Inserted candidate {} of {}: {}",
        candidate.candidate_index,
        candidate.total_candidates,
        candidate.candidate_name
    );
    Ok(())
}
