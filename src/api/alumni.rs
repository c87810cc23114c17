use crate::error::ClientResult;
use crate::http::{ApiClient, QueryParams};
use crate::models::{AlumniRecord, AlumniUpdate, GroupedAlumni};

use super::{segment, ALUMNI_GROUPED_PATH, ALUMNI_PATH};

impl ApiClient {
    pub async fn alumni(&self) -> ClientResult<Vec<AlumniRecord>> {
        self.get(ALUMNI_PATH).await?.data()
    }

    pub async fn alumni_grouped(&self) -> ClientResult<GroupedAlumni> {
        self.get(ALUMNI_GROUPED_PATH).await?.data()
    }

    /// Grouped listing filtered by name substring. A blank query is the unfiltered listing.
    pub async fn search_alumni_grouped(&self, query: &str) -> ClientResult<GroupedAlumni> {
        let query = query.trim();
        if query.is_empty() {
            return self.alumni_grouped().await;
        }
        let mut params = QueryParams::new();
        params.insert("search".to_string(), query.to_string());
        self.get_with_query(ALUMNI_GROUPED_PATH, &params).await?.data()
    }

    pub async fn alumnus(&self, id: &str) -> ClientResult<AlumniRecord> {
        self.get(&format!("{}/{}", ALUMNI_PATH, segment(id))).await?.data()
    }

    /// PATCH one field; returns whatever the backend echoes back.
    pub async fn update_alumnus(&self, id: &str, update: &AlumniUpdate) -> ClientResult<AlumniRecord> {
        self.patch(&format!("{}/{}", ALUMNI_PATH, segment(id)), &update.to_body()).await?.data()
    }
}
