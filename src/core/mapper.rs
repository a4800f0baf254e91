//! 將外部人員資料轉為固定格式的選民／候選人紀錄。
//!
//! 缺漏欄位在此視為違反契約，回傳 [`FeedError::MappingError`]，不填預設值。

use crate::domain::model::{Address, CandidateRecord, RawName, RawPerson, VoterRecord};
use crate::utils::error::{FeedError, Result};

fn require<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| FeedError::MappingError {
        field: field.to_string(),
    })
}

fn full_name(name: Option<&RawName>) -> Result<String> {
    let name = require(name, "name")?;
    let first = require(name.first.as_deref(), "name.first")?;
    let last = require(name.last.as_deref(), "name.last")?;
    Ok(format!("{} {}", first, last))
}

fn external_id(person: &RawPerson) -> Result<String> {
    let login = require(person.login.as_ref(), "login")?;
    let uuid = require(login.uuid.as_deref(), "login.uuid")?;
    if uuid.is_empty() {
        return Err(FeedError::MappingError {
            field: "login.uuid".to_string(),
        });
    }
    Ok(uuid.to_string())
}

fn picture_url(person: &RawPerson) -> Result<String> {
    let picture = require(person.picture.as_ref(), "picture")?;
    require(picture.large.clone(), "picture.large")
}

fn address(person: &RawPerson) -> Result<Address> {
    let location = require(person.location.as_ref(), "location")?;
    let street = require(location.street.as_ref(), "location.street")?;
    let number = require(street.number, "location.street.number")?;
    let street_name = require(street.name.as_deref(), "location.street.name")?;

    Ok(Address {
        street: format!("{} {}", number, street_name),
        city: require(location.city.clone(), "location.city")?,
        state: require(location.state.clone(), "location.state")?,
        country: require(location.country.clone(), "location.country")?,
        postcode: require(location.postcode.clone(), "location.postcode")?,
    })
}

pub fn map_voter(person: &RawPerson) -> Result<VoterRecord> {
    let login = require(person.login.as_ref(), "login")?;
    let dob = require(person.dob.as_ref(), "dob")?;
    let registered = require(person.registered.as_ref(), "registered")?;

    Ok(VoterRecord {
        voter_id: external_id(person)?,
        voter_name: full_name(person.name.as_ref())?,
        date_of_birth: require(dob.date.clone(), "dob.date")?,
        gender: require(person.gender.clone(), "gender")?,
        nationality: require(person.nat.clone(), "nat")?,
        registration_number: require(login.username.clone(), "login.username")?,
        address: address(person)?,
        email: require(person.email.clone(), "email")?,
        phone_number: require(person.phone.clone(), "phone")?,
        cell_number: require(person.cell.clone(), "cell")?,
        picture: picture_url(person)?,
        registered_age: require(registered.age, "registered.age")?,
    })
}

/// `index` 為 1 起算，必須滿足 `1 <= index <= total`
pub fn map_candidate(index: u32, total: u32, person: &RawPerson) -> Result<CandidateRecord> {
    if index == 0 || index > total {
        return Err(FeedError::InvalidCandidateIndex { index, total });
    }

    Ok(CandidateRecord {
        candidate_id: external_id(person)?,
        candidate_name: full_name(person.name.as_ref())?,
        candidate_index: index,
        total_candidates: total,
        picture: picture_url(person)?,
    })
}
