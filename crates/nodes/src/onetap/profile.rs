//! Profile operations.

use client::endpoints::profiles;
use client::{unwrap_data, OneTapClient, Payload, RecordPath};
use serde::Deserialize;
use serde_json::Value;

use super::{merged, required, spread, Listing};
use crate::params::{insert_set, normalize, Rules};
use crate::NodeError;

const FIELDS: Rules<'static> = Rules {
    id_lists: &[],
    locations: &[],
    dates: false,
    custom_fields: true,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum ProfileOperation {
    GetAll(Listing),
    GetSingle(ProfileId),
    Create(ProfileFields),
    Update(ProfileUpdate),
    Delete(ProfileId),
    GetCustomFields,
    GetByCheckInCode(CheckInCode),
    UpdateAvatar(Avatar),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileId {
    pub profile_id: String,
}

/// New profile: `name` plus any of the update fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFields {
    pub name: String,
    #[serde(default)]
    pub additional_fields: Payload,
}

/// `name`, `email`, `phone`, `address`, `notes`, `checkInCode`, `favorite`
/// and `customFields`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub profile_id: String,
    #[serde(default)]
    pub update_fields: Payload,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInCode {
    pub check_in_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Avatar {
    pub profile_id: String,
    pub avatar_url: String,
}

impl ProfileOperation {
    pub(crate) async fn run(&self, client: &OneTapClient) -> Result<Vec<Value>, NodeError> {
        match self {
            Self::GetAll(listing) => {
                let filters = normalize(&listing.additional_fields, &Rules::default())?;
                let query = merged(listing.page_query(50), filters);
                Ok(profiles::list(client, query, listing.return_all).await?)
            }
            Self::GetSingle(p) => {
                let id = required(&p.profile_id, "profileId")?;
                Ok(vec![unwrap_data(profiles::get(client, id).await?)])
            }
            Self::Create(fields) => {
                let mut body = Payload::new();
                insert_set(&mut body, "name", fields.name.as_str());
                let body = merged(body, normalize(&fields.additional_fields, &FIELDS)?);
                Ok(vec![unwrap_data(profiles::create(client, body).await?)])
            }
            Self::Update(update) => {
                let id = required(&update.profile_id, "profileId")?;
                let body = normalize(&update.update_fields, &FIELDS)?;
                Ok(vec![unwrap_data(profiles::update(client, id, body).await?)])
            }
            Self::Delete(p) => {
                let id = required(&p.profile_id, "profileId")?;
                Ok(vec![unwrap_data(profiles::delete(client, id).await?)])
            }
            Self::GetCustomFields => Ok(spread(
                profiles::custom_fields(client).await?,
                RecordPath::Data,
            )),
            Self::GetByCheckInCode(c) => {
                let code = required(&c.check_in_code, "checkInCode")?;
                Ok(vec![unwrap_data(profiles::by_check_in_code(client, code).await?)])
            }
            Self::UpdateAvatar(avatar) => {
                let mut body = Payload::new();
                insert_set(&mut body, "profileId", required(&avatar.profile_id, "profileId")?);
                insert_set(&mut body, "avatarUrl", required(&avatar.avatar_url, "avatarUrl")?);
                Ok(vec![unwrap_data(profiles::update_avatar(client, body).await?)])
            }
        }
    }
}
