use std::sync::Arc;

use crate::application::documents::DocumentService;
use crate::infra::http::HealthProbe;

#[derive(Clone)]
pub struct ApiState {
    pub documents: Arc<DocumentService>,
    pub health: Arc<dyn HealthProbe>,
}

impl ApiState {
    pub fn new(documents: Arc<DocumentService>, health: Arc<dyn HealthProbe>) -> Self {
        Self { documents, health }
    }
}
