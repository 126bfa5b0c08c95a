//! Seed generators
//!
//! A seed generator produces the tasks a freeze run starts from. Generators
//! are registered on the `Freezer` in order and all of them run at the start
//! of every freeze.

use crate::config::SeedEntry;
use crate::crawler::GenerationTask;
use crate::routing::RouteDescriptor;
use anyhow::{bail, Result};

/// Producer of initial crawl tasks
///
/// An error from `generate` aborts the whole run. Closures returning
/// `anyhow::Result<Vec<GenerationTask>>` are generators too.
pub trait SeedGenerator: Send + Sync {
    /// Name used in logs and in `FreezeError::GeneratorFailure`
    fn name(&self) -> &str {
        "custom"
    }

    fn generate(&self) -> Result<Vec<GenerationTask>>;
}

impl<F> SeedGenerator for F
where
    F: Fn() -> Result<Vec<GenerationTask>> + Send + Sync,
{
    fn generate(&self) -> Result<Vec<GenerationTask>> {
        self()
    }
}

/// Default generator: one parameterless task per declared route
///
/// Routes with path parameters produce tasks that fail to resolve unless
/// another generator supplies the parameters.
#[derive(Debug, Clone)]
pub struct RouteTableSeeds {
    routes: Vec<RouteDescriptor>,
}

impl RouteTableSeeds {
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        Self { routes }
    }
}

impl SeedGenerator for RouteTableSeeds {
    fn name(&self) -> &str {
        "routes"
    }

    fn generate(&self) -> Result<Vec<GenerationTask>> {
        Ok(self
            .routes
            .iter()
            .map(|route| GenerationTask::named_route(route.name.clone(), Default::default()))
            .collect())
    }
}

/// Tasks listed as `[[seed]]` entries in the config file
#[derive(Debug, Clone)]
pub struct ConfiguredSeeds {
    entries: Vec<SeedEntry>,
}

impl ConfiguredSeeds {
    pub fn new(entries: Vec<SeedEntry>) -> Self {
        Self { entries }
    }
}

impl SeedGenerator for ConfiguredSeeds {
    fn name(&self) -> &str {
        "config"
    }

    fn generate(&self) -> Result<Vec<GenerationTask>> {
        self.entries
            .iter()
            .map(|entry| match (&entry.route, &entry.url) {
                (Some(route), None) => Ok(GenerationTask::named_route(
                    route.clone(),
                    entry.params.clone(),
                )),
                (None, Some(url)) => Ok(GenerationTask::raw_url(url.clone())),
                _ => bail!("seed entry must set exactly one of `route` or `url`"),
            })
            .collect()
    }
}
