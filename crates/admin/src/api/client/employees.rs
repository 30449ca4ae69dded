//! Employee endpoints.

use tracing::instrument;

use storedesk_core::{EmployeeId, StoreId};

use super::{StoreApiClient, StoreApiError, store_path};
use crate::api::types::{Employee, EmployeeInvite};

impl StoreApiClient {
    /// # Errors
    ///
    /// Returns an error if any page fails to load.
    #[instrument(skip(self, token))]
    pub async fn list_all_employees(
        &self,
        token: &str,
        store_id: &StoreId,
    ) -> Result<Vec<Employee>, StoreApiError> {
        self.fetch_all(token, &store_path(store_id, "employees"))
            .await
    }

    /// Invite a new employee; the backend emails them.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the invite (e.g. the email is
    /// already on the team).
    #[instrument(skip(self, token, invite), fields(email = %invite.email, role = %invite.role))]
    pub async fn invite_employee(
        &self,
        token: &str,
        store_id: &StoreId,
        invite: &EmployeeInvite,
    ) -> Result<Employee, StoreApiError> {
        self.post_json(token, &store_path(store_id, "employees"), invite)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the delete fails.
    #[instrument(skip(self, token))]
    pub async fn remove_employee(
        &self,
        token: &str,
        store_id: &StoreId,
        id: &EmployeeId,
    ) -> Result<(), StoreApiError> {
        let path = store_path(
            store_id,
            &format!("employees/{}", urlencoding::encode(id.as_str())),
        );
        self.delete(token, &path).await
    }
}
