use crate::error::ClientResult;
use crate::http::ApiClient;
use crate::models::{BatchYear, EventRecord, NewEvent};

use super::{segment, to_body, BATCH_YEARS_PATH, EVENTS_PATH};

impl ApiClient {
    pub async fn events(&self) -> ClientResult<Vec<EventRecord>> {
        self.get(EVENTS_PATH).await?.data()
    }

    pub async fn create_event(&self, event: &NewEvent) -> ClientResult<EventRecord> {
        let body = to_body(event)?;
        self.post(EVENTS_PATH, Some(&body)).await?.data()
    }

    pub async fn event(&self, id: &str) -> ClientResult<EventRecord> {
        self.get(&format!("{}/{}", EVENTS_PATH, segment(id))).await?.data()
    }

    pub async fn batch_years(&self) -> ClientResult<Vec<BatchYear>> {
        self.get(BATCH_YEARS_PATH).await?.data()
    }
}
