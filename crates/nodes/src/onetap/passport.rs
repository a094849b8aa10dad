//! Passport operations.

use client::endpoints::passports;
use client::{unwrap_data, OneTapClient, Payload, RecordPath};
use serde::Deserialize;
use serde_json::Value;

use super::{merged, required, spread, Listing};
use crate::params::{normalize, Rules};
use crate::NodeError;

const FIELDS: Rules<'static> = Rules {
    id_lists: &[],
    locations: &[],
    dates: true,
    custom_fields: false,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum PassportOperation {
    GetAll(Listing),
    GetGroups,
    Send(SendPassport),
}

/// Deliver a passport to its holder, e.g. `{ "channel": "EMAIL" }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendPassport {
    pub passport_id: String,
    #[serde(default)]
    pub additional_fields: Payload,
}

impl PassportOperation {
    pub(crate) async fn run(&self, client: &OneTapClient) -> Result<Vec<Value>, NodeError> {
        match self {
            Self::GetAll(listing) => {
                let query = merged(
                    listing.page_query(50),
                    normalize(&listing.additional_fields, &FIELDS)?,
                );
                Ok(passports::list(client, query, listing.return_all).await?)
            }
            Self::GetGroups => Ok(spread(passports::groups(client).await?, RecordPath::Data)),
            Self::Send(s) => {
                let id = required(&s.passport_id, "passportId")?;
                let body = normalize(&s.additional_fields, &FIELDS)?;
                Ok(vec![unwrap_data(passports::send(client, id, body).await?)])
            }
        }
    }
}
