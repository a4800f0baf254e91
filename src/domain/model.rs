use serde::{Deserialize, Deserializer, Serialize};

/// randomuser 風格 API 的回應外殼
#[derive(Debug, Clone, Deserialize)]
pub struct PersonResponse {
    #[serde(default)]
    pub results: Vec<RawPerson>,
}

/// 外部人員資料；所有欄位皆可缺漏，缺漏與否由 mapper 判斷
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPerson {
    pub login: Option<RawLogin>,
    pub name: Option<RawName>,
    pub dob: Option<RawDob>,
    pub gender: Option<String>,
    pub nat: Option<String>,
    pub location: Option<RawLocation>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cell: Option<String>,
    pub picture: Option<RawPicture>,
    pub registered: Option<RawRegistered>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLogin {
    pub uuid: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawName {
    pub first: Option<String>,
    pub last: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDob {
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLocation {
    pub street: Option<RawStreet>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub postcode: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStreet {
    pub number: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPicture {
    pub large: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRegistered {
    pub age: Option<i32>,
}

// 英國郵遞區號是字串，其他國家常以數字回傳
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postcode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRecord {
    pub voter_id: String,
    pub voter_name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub nationality: String,
    pub registration_number: String,
    pub address: Address,
    pub email: String,
    pub phone_number: String,
    pub cell_number: String,
    pub picture: String,
    pub registered_age: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub candidate_id: String,
    pub candidate_name: String,
    pub candidate_index: u32,
    pub total_candidates: u32,
    pub picture: String,
}

/// 單次發布的結果；由傳輸層在背景執行緒回報，恰好一次
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered { topic: String, partition: i32 },
    Failed { error: String },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSummary {
    pub candidates_inserted: usize,
    pub voters_inserted: usize,
    pub voters_published: usize,
    pub fetch_failures: usize,
}
