//! Punch pass operations.

use client::endpoints::passports;
use client::{unwrap_data, OneTapClient, Payload};
use serde::Deserialize;
use serde_json::Value;

use super::{merged, required, Listing};
use crate::params::{insert_set, normalize, Rules};
use crate::NodeError;

/// `greaterThanDate` / `lessThanDate` go out as epoch seconds.
const FILTERS: Rules<'static> = Rules {
    id_lists: &[],
    locations: &[],
    dates: true,
    custom_fields: false,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum PunchPassOperation {
    GetAll(PunchPassListing),
    GetSingle(PunchPassDetail),
    Redeem(Redeem),
}

/// A profile's punch passes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PunchPassListing {
    pub profile_id: String,
    #[serde(flatten)]
    pub listing: Listing,
}

/// One punch pass, with its check-ins filtered by `additionalFields`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PunchPassDetail {
    pub passport_id: String,
    #[serde(flatten)]
    pub listing: Listing,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redeem {
    pub passport_id: String,
    #[serde(default)]
    pub additional_fields: Payload,
}

impl PunchPassOperation {
    pub(crate) async fn run(&self, client: &OneTapClient) -> Result<Vec<Value>, NodeError> {
        match self {
            Self::GetAll(p) => {
                let listing = &p.listing;
                let mut query = merged(
                    listing.page_query(50),
                    normalize(&listing.additional_fields, &FILTERS)?,
                );
                insert_set(&mut query, "profileId", required(&p.profile_id, "profileId")?);
                Ok(passports::punch_passes(client, query, listing.return_all).await?)
            }
            Self::GetSingle(p) => {
                let id = required(&p.passport_id, "passportId")?;
                let query = merged(
                    p.listing.page_query(50),
                    normalize(&p.listing.additional_fields, &FILTERS)?,
                );
                Ok(vec![unwrap_data(passports::punch_pass(client, id, query).await?)])
            }
            Self::Redeem(r) => {
                let id = required(&r.passport_id, "passportId")?;
                let body = normalize(&r.additional_fields, &FILTERS)?;
                Ok(vec![unwrap_data(
                    passports::redeem_punch_pass(client, id, body).await?,
                )])
            }
        }
    }
}
