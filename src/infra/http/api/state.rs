use std::sync::Arc;

use crate::application::auth::IdentityProvider;
use crate::application::content::{
    CategoryService, MessageService, ProjectService, ServiceCatalogService,
};
use crate::application::settings::SiteSettingsService;
use crate::infra::uploads::ImageStorage;

#[derive(Clone)]
pub struct ApiState {
    pub identity: Arc<dyn IdentityProvider>,
    pub settings: Arc<SiteSettingsService>,
    pub categories: Arc<CategoryService>,
    pub projects: Arc<ProjectService>,
    pub services: Arc<ServiceCatalogService>,
    pub messages: Arc<MessageService>,
    pub images: Arc<ImageStorage>,
    pub allow_signup: bool,
}
