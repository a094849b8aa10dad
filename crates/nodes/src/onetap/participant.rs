//! Participant operations: membership of a profile in a list, and its
//! check-in/check-out state.
//!
//! Participant endpoints answer with bare JSON, which is emitted untouched.

use client::endpoints::participants;
use client::{OneTapClient, Payload};
use serde::Deserialize;
use serde_json::Value;

use super::{merged, required, Listing};
use crate::params::{insert_set, normalize, Rules};
use crate::NodeError;

const CREATE: Rules<'static> = Rules {
    id_lists: &["listIds", "profileIds"],
    locations: &["checkInLocation", "checkOutLocation"],
    dates: true,
    custom_fields: false,
};

const UPDATE: Rules<'static> = Rules {
    id_lists: &[],
    locations: &["location"],
    dates: true,
    custom_fields: false,
};

/// Check-in/out fields are sent as given, apart from the location.
const CHECK: Rules<'static> = Rules {
    id_lists: &[],
    locations: &["location"],
    dates: false,
    custom_fields: false,
};

/// Filters keep ID lists as plain strings; only dates are converted.
const FILTERS: Rules<'static> = Rules {
    id_lists: &[],
    locations: &[],
    dates: true,
    custom_fields: false,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum ParticipantOperation {
    Create(CreateParticipants),
    GetSingle(ParticipantId),
    Update(UpdateParticipant),
    GetAll(Listing),
    Delete(DeleteParticipant),
    CheckIn(Check),
    CheckOut(Check),
    UndoCheckIn(ParticipantId),
    UndoCheckOut(ParticipantId),
}

/// Add one or more profiles to one or more lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateParticipants {
    pub list_id: String,
    pub list_ids: String,
    pub profile_id: String,
    pub profile_ids: String,
    pub add_all_profile: Option<bool>,
    pub additional_fields: Payload,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantId {
    pub participant_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParticipant {
    pub participant_id: String,
    #[serde(default)]
    pub update_fields: Payload,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParticipant {
    pub participant_id: String,
    #[serde(default)]
    pub list_id: Option<String>,
}

/// Check-in or check-out: `listId`, `profileId`, `method`, `location`, ...
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Check {
    pub participant_id: String,
    #[serde(default)]
    pub check_fields: Payload,
}

impl CreateParticipants {
    fn body(&self) -> Result<Payload, NodeError> {
        let mut fields = Payload::new();
        insert_set(&mut fields, "listId", self.list_id.as_str());
        insert_set(&mut fields, "listIds", self.list_ids.as_str());
        insert_set(&mut fields, "profileId", self.profile_id.as_str());
        insert_set(&mut fields, "profileIds", self.profile_ids.as_str());
        if let Some(all) = self.add_all_profile {
            fields.insert("addAllProfile".to_owned(), all.into());
        }
        let fields = merged(fields, self.additional_fields.clone());
        Ok(normalize(&fields, &CREATE)?)
    }
}

impl ParticipantOperation {
    pub(crate) async fn run(&self, client: &OneTapClient) -> Result<Vec<Value>, NodeError> {
        let response = match self {
            Self::Create(create) => participants::create(client, create.body()?).await?,
            Self::GetSingle(p) => {
                participants::get(client, required(&p.participant_id, "participantId")?).await?
            }
            Self::Update(u) => {
                let id = required(&u.participant_id, "participantId")?;
                participants::update(client, id, normalize(&u.update_fields, &UPDATE)?).await?
            }
            Self::GetAll(listing) => {
                let query = merged(
                    listing.offset_query(100),
                    normalize(&listing.additional_fields, &FILTERS)?,
                );
                return Ok(participants::list(client, query, listing.return_all).await?);
            }
            Self::Delete(d) => {
                let id = required(&d.participant_id, "participantId")?;
                participants::delete(client, id, d.list_id.as_deref()).await?
            }
            Self::CheckIn(c) => {
                let id = required(&c.participant_id, "participantId")?;
                participants::check_in(client, id, normalize(&c.check_fields, &CHECK)?).await?
            }
            Self::CheckOut(c) => {
                let id = required(&c.participant_id, "participantId")?;
                participants::check_out(client, id, normalize(&c.check_fields, &CHECK)?).await?
            }
            Self::UndoCheckIn(p) => {
                participants::undo_check_in(client, required(&p.participant_id, "participantId")?)
                    .await?
            }
            Self::UndoCheckOut(p) => {
                participants::undo_check_out(client, required(&p.participant_id, "participantId")?)
                    .await?
            }
        };
        Ok(vec![response])
    }
}
