//! List operations.

use client::endpoints::lists;
use client::{unwrap_data, OneTapClient, Payload};
use serde::Deserialize;
use serde_json::Value;

use super::{merged, required, Listing};
use crate::params::{insert_set, normalize, Rules};
use crate::NodeError;

const FIELDS: Rules<'static> = Rules {
    id_lists: &[],
    locations: &[],
    dates: true,
    custom_fields: false,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum ListOperation {
    GetAll(Listing),
    GetSingle(ListId),
    Create(CreateList),
    Update(UpdateList),
    Delete(ListId),
    GetSurvey(ListId),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListId {
    pub list_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateList {
    pub name: String,
    #[serde(default)]
    pub additional_fields: Payload,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateList {
    pub list_id: String,
    #[serde(default)]
    pub update_fields: Payload,
}

impl ListOperation {
    pub(crate) async fn run(&self, client: &OneTapClient) -> Result<Vec<Value>, NodeError> {
        let response = match self {
            Self::GetAll(listing) => {
                let query = merged(
                    listing.offset_query(100),
                    normalize(&listing.additional_fields, &FIELDS)?,
                );
                return Ok(lists::list(client, query, listing.return_all).await?);
            }
            Self::GetSingle(l) => lists::get(client, required(&l.list_id, "listId")?).await?,
            Self::Create(c) => {
                let mut body = Payload::new();
                insert_set(&mut body, "name", c.name.as_str());
                lists::create(client, merged(body, normalize(&c.additional_fields, &FIELDS)?))
                    .await?
            }
            Self::Update(u) => {
                let id = required(&u.list_id, "listId")?;
                lists::update(client, id, normalize(&u.update_fields, &FIELDS)?).await?
            }
            Self::Delete(l) => lists::delete(client, required(&l.list_id, "listId")?).await?,
            Self::GetSurvey(l) => lists::survey(client, required(&l.list_id, "listId")?).await?,
        };
        Ok(vec![unwrap_data(response)])
    }
}
