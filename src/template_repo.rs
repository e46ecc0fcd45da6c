//! Template loading behind an explicit repository interface.
//!
//! Construct one repository at process start and pass it by reference; no
//! module-level cache. The caching wrapper memoizes loads and supports
//! explicit invalidation, which is all the template cache semantics the
//! rendering layer needs.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{ModelError, Template};

pub trait TemplateRepository {
    fn load(&self, template_id: &str) -> Result<Template, ModelError>;
    fn invalidate(&self, template_id: &str);
}

/// Fixed set of templates, preloaded. Invalidation is a no-op since there
/// is no backing source to go stale against.
pub struct StaticTemplateRepository {
    templates: HashMap<String, Template>,
}

impl StaticTemplateRepository {
    pub fn new(templates: impl IntoIterator<Item = Template>) -> Self {
        Self {
            templates: templates
                .into_iter()
                .map(|t| (t.template_id.clone(), t))
                .collect(),
        }
    }
}

impl TemplateRepository for StaticTemplateRepository {
    fn load(&self, template_id: &str) -> Result<Template, ModelError> {
        self.templates
            .get(template_id)
            .cloned()
            .ok_or_else(|| ModelError::TemplateNotFound(template_id.to_string()))
    }

    fn invalidate(&self, _template_id: &str) {}
}

/// Memoize-on-load over any inner repository with explicit invalidation.
pub struct CachingTemplateRepository<R: TemplateRepository> {
    inner: R,
    cache: Mutex<HashMap<String, Template>>,
}

impl<R: TemplateRepository> CachingTemplateRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }
}

impl<R: TemplateRepository> TemplateRepository for CachingTemplateRepository<R> {
    fn load(&self, template_id: &str) -> Result<Template, ModelError> {
        if let Ok(cache) = self.cache.lock() {
            if let Some(template) = cache.get(template_id) {
                return Ok(template.clone());
            }
        }

        let template = self.inner.load(template_id)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(template_id.to_string(), template.clone());
        }
        Ok(template)
    }

    fn invalidate(&self, template_id: &str) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.remove(template_id);
        }
        self.inner.invalidate(template_id);
        tracing::debug!(template_id, "Template cache invalidated");
    }
}
