use crate::domain::ports::SqlSession;
use crate::utils::error::Result;

pub const CREATE_CANDIDATES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS candidates (
        candidate_id VARCHAR(255) PRIMARY KEY,
        candidate_name VARCHAR(255),
        candidate_index INTEGER,
        total_candidates INTEGER,
        picture TEXT
    )";

pub const CREATE_VOTERS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS voters (
        voter_id VARCHAR(255) PRIMARY KEY,
        voter_name VARCHAR(255),
        date_of_birth VARCHAR(255),
        gender VARCHAR(255),
        nationality VARCHAR(255),
        registration_number VARCHAR(255),
        street VARCHAR(255),
        city VARCHAR(255),
        state VARCHAR(255),
        country VARCHAR(255),
        postcode VARCHAR(255),
        email VARCHAR(255),
        phone_number VARCHAR(255),
        cell_number VARCHAR(255),
        picture TEXT,
        registered_age INTEGER
    )";

pub const CREATE_VOTES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS votes (
        voter_id VARCHAR(255) UNIQUE,
        candidate_id VARCHAR(255),
        voting_time TIMESTAMP,
        vote INTEGER DEFAULT 1,
        PRIMARY KEY (voter_id, candidate_id)
    )";

/// 建立 candidates、voters、votes 三張表後 commit。
///
/// 可重複呼叫；任何語句失敗都直接往上回傳，不做部分建立的補救。
pub async fn ensure_schema<S: SqlSession + ?Sized>(session: &mut S) -> Result<()> {
    for (table, ddl) in [
        ("candidates", CREATE_CANDIDATES_TABLE),
        ("voters", CREATE_VOTERS_TABLE),
        ("votes", CREATE_VOTES_TABLE),
    ] {
        session.execute(ddl, &[]).await?;
        tracing::debug!("Ensured table '{}' exists", table);
    }

    session.commit().await?;
    tracing::info!("🗄️  Schema ready (candidates, voters, votes)");
    Ok(())
}
