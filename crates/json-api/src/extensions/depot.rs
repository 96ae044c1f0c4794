//! Depot helper extensions.

use std::sync::Arc;

use salvo::prelude::{Depot, StatusError};
use tracing::error;

use crate::state::State;

/// Access to what the router injected into the depot.
pub(crate) trait DepotExt {
    /// The shared [`State`], or a 500 when the router was built without it.
    fn state(&self) -> Result<&State, StatusError>;
}

impl DepotExt for Depot {
    fn state(&self) -> Result<&State, StatusError> {
        match self.obtain::<Arc<State>>() {
            Ok(state) => Ok(state.as_ref()),
            Err(_missing) => {
                error!("application state missing from depot");

                Err(StatusError::internal_server_error())
            }
        }
    }
}
